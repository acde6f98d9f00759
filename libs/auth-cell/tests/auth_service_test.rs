use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};

use auth_cell::{AuthError, AuthService, InMemoryUserDirectory, RegisterRequest, SessionStore};
use doctor_cell::{DoctorDirectory, InMemoryDoctorDirectory, Specialty};
use patient_cell::{InMemoryPatientDirectory, PatientDirectory};
use security_cell::{AuditAct, AuditQuery, AuditService};
use shared_models::{AppError, Role};
use shared_utils::telemetry::init_test_tracing;
use shared_utils::test_utils::manual_clock;
use shared_utils::{Clock, ManualClock, RandomIdGenerator};

struct Harness {
    auth: AuthService,
    users: Arc<InMemoryUserDirectory>,
    patients: Arc<InMemoryPatientDirectory>,
    doctors: Arc<InMemoryDoctorDirectory>,
    audit: Arc<AuditService>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    init_test_tracing();
    let clock = manual_clock();
    let ids = Arc::new(RandomIdGenerator);
    let users = Arc::new(InMemoryUserDirectory::new());
    let patients = Arc::new(InMemoryPatientDirectory::new());
    let doctors = Arc::new(InMemoryDoctorDirectory::new());
    let audit = Arc::new(AuditService::new(clock.clone(), ids.clone()));
    let sessions = SessionStore::new(clock.clone(), ids.clone(), Duration::hours(24));

    let auth = AuthService::new(
        users.clone(),
        patients.clone(),
        doctors.clone(),
        sessions,
        audit.clone(),
        clock.clone(),
        ids,
    );

    Harness { auth, users, patients, doctors, audit, clock }
}

fn registration(email: &str, role: Role) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "s3cret-pass".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        phone: "+10000000000".to_string(),
        role,
        specialty: None,
    }
}

#[tokio::test]
async fn register_patient_creates_profile_and_session() {
    let h = harness();

    let result = h.auth.register(registration("pat@example.com", Role::Patient)).await.unwrap();

    assert_eq!(result.role, Role::Patient);
    let patient = h.patients.find_by_user_id(result.user_id).await.unwrap().unwrap();
    assert_eq!(patient.email, "pat@example.com");

    let user = h.auth.authenticate(result.token).await.unwrap();
    assert_eq!(user.id, result.user_id);
    assert!(!user.is_blocked);
}

#[tokio::test]
async fn register_doctor_defaults_to_general_practice() {
    let h = harness();

    let result = h.auth.register(registration("doc@example.com", Role::Doctor)).await.unwrap();

    let doctor = h.doctors.find_by_user_id(result.user_id).await.unwrap().unwrap();
    assert_eq!(doctor.specialty, Specialty::GeneralPractitioner);
}

#[tokio::test]
async fn register_rejects_bad_input() {
    let h = harness();

    let mut missing = registration("", Role::Patient);
    missing.password = String::new();
    assert_matches!(h.auth.register(missing).await, Err(AuthError::InvalidArgument(_)));

    let mut unborn = registration("future@example.com", Role::Patient);
    unborn.birth_date = h.clock.now().date_naive() + Duration::days(1);
    assert_matches!(
        h.auth.register(unborn).await,
        Err(AuthError::InvalidArgument(msg)) if msg == "Birth date must be in the past."
    );

    h.auth.register(registration("dup@example.com", Role::Patient)).await.unwrap();
    let duplicate = h.auth.register(registration("DUP@example.com", Role::Doctor)).await;
    assert_matches!(duplicate, Err(AuthError::Conflict(msg)) if msg == "Email is already registered.");
}

#[tokio::test]
async fn login_checks_credentials_and_block() {
    let h = harness();
    let registered = h.auth.register(registration("pat@example.com", Role::Patient)).await.unwrap();

    let wrong = h.auth.login("pat@example.com", "nope").await;
    assert_matches!(wrong, Err(AuthError::Unauthorized(msg)) if msg == "Invalid credentials.");

    let unknown = h.auth.login("ghost@example.com", "s3cret-pass").await;
    assert_matches!(unknown, Err(AuthError::Unauthorized(msg)) if msg == "Invalid credentials.");

    let ok = h.auth.login("pat@example.com", "s3cret-pass").await.unwrap();
    assert_eq!(ok.user_id, registered.user_id);
    assert_ne!(ok.token, registered.token);

    assert!(h.users.set_blocked(registered.user_id, true).await);
    let blocked = h.auth.login("pat@example.com", "s3cret-pass").await;
    assert_matches!(blocked, Err(AuthError::Unauthorized(msg)) if msg == "User is blocked.");

    let err: AppError = h.auth.authenticate(ok.token).await.unwrap_err().into();
    assert_eq!(err, AppError::Auth("User is blocked.".to_string()));
}

#[tokio::test]
async fn blocked_user_is_refused_before_password_check() {
    let h = harness();
    let registered = h.auth.register(registration("pat@example.com", Role::Patient)).await.unwrap();
    assert!(h.users.set_blocked(registered.user_id, true).await);

    let wrong_password = h.auth.login("pat@example.com", "wrong").await;
    assert_matches!(wrong_password, Err(AuthError::Unauthorized(msg)) if msg == "User is blocked.");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let h = harness();
    assert_matches!(h.auth.login("  ", "x").await, Err(AuthError::InvalidArgument(_)));
    assert_matches!(h.auth.login("a@example.com", "").await, Err(AuthError::InvalidArgument(_)));
}

#[tokio::test]
async fn logout_revokes_token() {
    let h = harness();
    let result = h.auth.register(registration("pat@example.com", Role::Patient)).await.unwrap();

    h.auth.logout(result.token).await;

    let err = h.auth.authenticate(result.token).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized("Invalid or expired token.".to_string()));
}

#[tokio::test]
async fn authenticate_fails_after_expiry_and_for_removed_user() {
    let h = harness();
    let result = h.auth.register(registration("pat@example.com", Role::Patient)).await.unwrap();

    assert!(h.users.remove(result.user_id).await);
    let err = h.auth.authenticate(result.token).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized("User not found.".to_string()));

    h.clock.advance(Duration::hours(25));
    let err = h.auth.authenticate(result.token).await.unwrap_err();
    assert_eq!(err, AuthError::Unauthorized("Invalid or expired token.".to_string()));
    assert!(h.auth.sessions().is_empty().await);
}

#[tokio::test]
async fn auth_events_are_audited() {
    let h = harness();
    let result = h.auth.register(registration("pat@example.com", Role::Patient)).await.unwrap();
    let _ = h.auth.login("pat@example.com", "bad").await;

    let entries = h
        .audit
        .search(&AuditQuery {
            user_id: Some(result.user_id),
            action: Some(AuditAct::Auth),
            ..Default::default()
        })
        .await
        .unwrap();

    let details: Vec<&str> = entries.iter().map(|e| e.details.as_str()).collect();
    assert_eq!(details, vec!["Registered as patient", "Login failed: wrong password"]);
}
