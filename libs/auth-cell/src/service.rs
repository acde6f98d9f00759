use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::{Doctor, DoctorDirectory};
use patient_cell::{Patient, PatientDirectory};
use security_cell::{AuditAct, AuditEvent, AuditSink, PasswordSecurityService};
use shared_models::{Role, User};
use shared_utils::{generate_unique_id, Clock, IdGenerator, MAX_ID_ATTEMPTS};

use crate::models::{AuthError, AuthResult, RegisterRequest, UserAccount};
use crate::session::SessionStore;
use crate::users::UserDirectory;

pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    patients: Arc<dyn PatientDirectory>,
    doctors: Arc<dyn DoctorDirectory>,
    sessions: SessionStore,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        patients: Arc<dyn PatientDirectory>,
        doctors: Arc<dyn DoctorDirectory>,
        sessions: SessionStore,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            users,
            patients,
            doctors,
            sessions,
            audit,
            clock,
            ids,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Creates the account and its patient or doctor profile, then signs the
    /// new user in.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResult, AuthError> {
        let email = request.email.trim().to_string();
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::InvalidArgument("Email and password are required.".to_string()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Registration attempted with an existing email");
            return Err(AuthError::Conflict("Email is already registered.".to_string()));
        }

        let now = self.clock.now();
        if request.birth_date >= now.date_naive() {
            return Err(AuthError::InvalidArgument("Birth date must be in the past.".to_string()));
        }

        let password_hash = PasswordSecurityService::hash_password(&request.password)
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))?;

        let users = Arc::clone(&self.users);
        let user_id = generate_unique_id(self.ids.as_ref(), MAX_ID_ATTEMPTS, |candidate| {
            let users = Arc::clone(&users);
            async move { Ok::<bool, AuthError>(users.find_by_id(candidate).await?.is_some()) }
        })
        .await?;

        let user = User {
            id: user_id,
            email: email.clone(),
            role: request.role,
            is_blocked: false,
            created_at: now,
        };
        self.users.insert(UserAccount { user, password_hash }).await?;

        match request.role {
            Role::Patient => {
                let patients = Arc::clone(&self.patients);
                let id = generate_unique_id(self.ids.as_ref(), MAX_ID_ATTEMPTS, |candidate| {
                    let patients = Arc::clone(&patients);
                    async move { Ok::<bool, AuthError>(patients.find_by_id(candidate).await?.is_some()) }
                })
                .await?;

                self.patients
                    .insert(Patient {
                        id,
                        user_id,
                        first_name: request.first_name,
                        last_name: request.last_name,
                        birth_date: request.birth_date,
                        phone: request.phone,
                        email,
                        created_at: now,
                    })
                    .await?;
            }
            Role::Doctor => {
                let doctors = Arc::clone(&self.doctors);
                let id = generate_unique_id(self.ids.as_ref(), MAX_ID_ATTEMPTS, |candidate| {
                    let doctors = Arc::clone(&doctors);
                    async move { Ok::<bool, AuthError>(doctors.find_by_id(candidate).await?.is_some()) }
                })
                .await?;

                self.doctors
                    .insert(Doctor {
                        id,
                        user_id,
                        first_name: request.first_name,
                        last_name: request.last_name,
                        birth_date: request.birth_date,
                        phone: request.phone,
                        email,
                        specialty: request.specialty.unwrap_or_default(),
                        created_at: now,
                    })
                    .await?;
            }
            Role::Admin => {}
        }

        let token = self.sessions.create_session(user_id, None).await?;

        info!("User {} registered as {}", user_id, request.role);
        self.safe_log(Some(user_id), format!("Registered as {}", request.role)).await;

        Ok(AuthResult {
            token,
            user_id,
            role: request.role,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidArgument("Email and password are required.".to_string()));
        }

        let Some(account) = self.users.find_by_email(email).await? else {
            self.safe_log(None, "Login failed: unknown email".to_string()).await;
            return Err(AuthError::Unauthorized("Invalid credentials.".to_string()));
        };
        let user = account.user;

        if user.is_blocked {
            self.safe_log(Some(user.id), "Login refused: user is blocked".to_string()).await;
            return Err(AuthError::Unauthorized("User is blocked.".to_string()));
        }

        let verified = PasswordSecurityService::verify_password(password, &account.password_hash)
            .map_err(|e| AuthError::Internal(format!("Stored password hash is unreadable: {}", e)))?;
        if !verified {
            self.safe_log(Some(user.id), "Login failed: wrong password".to_string()).await;
            return Err(AuthError::Unauthorized("Invalid credentials.".to_string()));
        }

        let token = self.sessions.create_session(user.id, None).await?;

        info!("User {} logged in", user.id);
        self.safe_log(Some(user.id), "Logged in".to_string()).await;

        Ok(AuthResult {
            token,
            user_id: user.id,
            role: user.role,
        })
    }

    pub async fn logout(&self, token: Uuid) {
        let user_id = self.sessions.validate_session(token).await;
        self.sessions.revoke_session(token).await;

        if let Some(user_id) = user_id {
            info!("User {} logged out", user_id);
            self.safe_log(Some(user_id), "Logged out".to_string()).await;
        }
    }

    /// Resolves a bearer token to its user.
    pub async fn authenticate(&self, token: Uuid) -> Result<User, AuthError> {
        let user_id = self
            .sessions
            .validate_session(token)
            .await
            .ok_or_else(|| AuthError::Unauthorized("Invalid or expired token.".to_string()))?;

        let account = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("User not found.".to_string()))?;

        if account.user.is_blocked {
            debug!("Blocked user {} presented a valid token", user_id);
            return Err(AuthError::Unauthorized("User is blocked.".to_string()));
        }

        Ok(account.user)
    }

    async fn safe_log(&self, user_id: Option<Uuid>, details: String) {
        let event = AuditEvent::new(user_id, AuditAct::Auth, details);
        if let Err(err) = self.audit.record(event).await {
            warn!("Failed to write audit entry: {}", err);
        }
    }
}
