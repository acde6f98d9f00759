use std::sync::Arc;

use assert_matches::assert_matches;
use tokio_test::assert_ok;
use chrono::Duration;
use uuid::Uuid;

use security_cell::{
    AuditAct, AuditError, AuditEvent, AuditQuery, AuditService, AuditSink, AuditSortField,
};
use shared_models::SortDirection;
use shared_utils::test_utils::{fixed_now, manual_clock};
use shared_utils::{ManualClock, RandomIdGenerator, SequenceIdGenerator};

fn service(clock: Arc<ManualClock>) -> AuditService {
    AuditService::new(clock, Arc::new(RandomIdGenerator))
}

#[tokio::test]
async fn record_assigns_id_and_clock_timestamp() {
    let clock = manual_clock();
    let audit = service(clock.clone());
    let user = Uuid::new_v4();

    let entry = audit
        .record(AuditEvent::new(Some(user), AuditAct::Appointment, "Booked"))
        .await
        .unwrap();

    assert!(!entry.id.is_nil());
    assert_eq!(entry.timestamp, fixed_now());
    assert_eq!(entry.user_id, Some(user));
    assert_eq!(entry.details, "Booked");
    assert_eq!(audit.len().await, 1);
}

#[tokio::test]
async fn search_filters_and_orders_by_timestamp() {
    let clock = manual_clock();
    let audit = service(clock.clone());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    audit.record(AuditEvent::new(Some(alice), AuditAct::Auth, "login")).await.unwrap();
    clock.advance(Duration::minutes(5));
    audit.record(AuditEvent::new(Some(bob), AuditAct::Appointment, "booked")).await.unwrap();
    clock.advance(Duration::minutes(5));
    audit.record(AuditEvent::new(Some(alice), AuditAct::Appointment, "closed")).await.unwrap();

    let for_alice = audit
        .search(&AuditQuery {
            user_id: Some(alice),
            sort: SortDirection::Descending,
            ..Default::default()
        })
        .await
        .unwrap();
    let details: Vec<&str> = for_alice.iter().map(|e| e.details.as_str()).collect();
    assert_eq!(details, vec!["closed", "login"]);

    let appointments_after_start = audit
        .search(&AuditQuery {
            action: Some(AuditAct::Appointment),
            from: Some(fixed_now() + Duration::minutes(1)),
            ..Default::default()
        })
        .await
        .unwrap();
    let users: Vec<Option<Uuid>> = appointments_after_start.iter().map(|e| e.user_id).collect();
    assert_eq!(users, vec![Some(bob), Some(alice)]);
}

#[tokio::test]
async fn to_includes_the_rest_of_its_day() {
    let clock = manual_clock();
    let audit = service(clock.clone());

    audit.record(AuditEvent::new(None, AuditAct::Auth, "morning")).await.unwrap();
    clock.advance(Duration::hours(7));
    audit.record(AuditEvent::new(None, AuditAct::Auth, "afternoon")).await.unwrap();
    clock.advance(Duration::days(1));
    audit.record(AuditEvent::new(None, AuditAct::Auth, "next day")).await.unwrap();

    let same_day = audit
        .search(&AuditQuery {
            to: Some(fixed_now()),
            ..Default::default()
        })
        .await
        .unwrap();
    let details: Vec<&str> = same_day.iter().map(|e| e.details.as_str()).collect();
    assert_eq!(details, vec!["morning", "afternoon"]);
}

#[tokio::test]
async fn search_sorts_by_action_then_timestamp() {
    let clock = manual_clock();
    let audit = service(clock.clone());

    audit.record(AuditEvent::new(None, AuditAct::Appointment, "booked")).await.unwrap();
    clock.advance(Duration::minutes(1));
    audit.record(AuditEvent::new(None, AuditAct::Auth, "login")).await.unwrap();
    clock.advance(Duration::minutes(1));
    audit.record(AuditEvent::new(None, AuditAct::Appointment, "closed")).await.unwrap();
    clock.advance(Duration::minutes(1));
    audit.record(AuditEvent::new(None, AuditAct::Auth, "logout")).await.unwrap();

    let by_action = audit
        .search(&AuditQuery {
            sort_by: AuditSortField::Action,
            sort: SortDirection::Descending,
            ..Default::default()
        })
        .await
        .unwrap();
    let details: Vec<&str> = by_action.iter().map(|e| e.details.as_str()).collect();
    assert_eq!(details, vec!["booked", "closed", "login", "logout"]);
}

#[tokio::test]
async fn search_sorts_by_user() {
    let clock = manual_clock();
    let audit = service(clock.clone());
    let low = Uuid::from_u128(1);
    let high = Uuid::from_u128(2);

    audit.record(AuditEvent::new(Some(high), AuditAct::Auth, "high")).await.unwrap();
    clock.advance(Duration::minutes(1));
    audit.record(AuditEvent::new(None, AuditAct::Auth, "anonymous")).await.unwrap();
    clock.advance(Duration::minutes(1));
    audit.record(AuditEvent::new(Some(low), AuditAct::Auth, "low")).await.unwrap();

    let by_user = audit
        .search(&AuditQuery {
            sort_by: AuditSortField::UserId,
            ..Default::default()
        })
        .await
        .unwrap();
    let details: Vec<&str> = by_user.iter().map(|e| e.details.as_str()).collect();
    assert_eq!(details, vec!["anonymous", "low", "high"]);
}

#[tokio::test]
async fn search_rejects_inverted_range() {
    let audit = service(manual_clock());

    let result = audit
        .search(&AuditQuery {
            from: Some(fixed_now()),
            to: Some(fixed_now() - Duration::days(1)),
            ..Default::default()
        })
        .await;

    assert_matches!(result, Err(AuditError::InvalidArgument(msg)) if msg == "From cannot be greater than To.");
}

#[tokio::test]
async fn colliding_ids_are_regenerated() {
    let taken = Uuid::new_v4();
    let fresh = Uuid::new_v4();
    let ids = SequenceIdGenerator::new([taken, taken, fresh]);
    let audit = AuditService::new(manual_clock(), Arc::new(ids));

    let first = audit.record(AuditEvent::new(None, AuditAct::Report, "a")).await.unwrap();
    let second = audit.record(AuditEvent::new(None, AuditAct::Report, "b")).await.unwrap();

    assert_eq!(first.id, taken);
    assert_eq!(second.id, fresh);
}

#[tokio::test]
async fn exhausted_id_space_is_reported() {
    let stuck = Uuid::new_v4();
    let ids = SequenceIdGenerator::repeating(stuck, 64);
    let audit = AuditService::new(manual_clock(), Arc::new(ids));

    assert_ok!(audit.record(AuditEvent::new(None, AuditAct::User, "first")).await);
    let result = audit.record(AuditEvent::new(None, AuditAct::User, "second")).await;

    assert_matches!(result, Err(AuditError::IdSpaceExhausted(16)));
    assert_eq!(audit.len().await, 1);
}
