mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use appointment_cell::{AppointmentStatus, ReportRequest, ReportService};
use common::{patient, Fixture};
use doctor_cell::Specialty;
use patient_cell::{Patient, PatientDirectory};
use security_cell::{AuditAct, AuditEntry, AuditError, AuditEvent, AuditQuery, AuditService, AuditSink};
use shared_utils::test_utils::{at, fixed_now};
use shared_utils::RandomIdGenerator;

struct BrokenAudit;

#[async_trait]
impl AuditSink for BrokenAudit {
    async fn record(&self, _event: AuditEvent) -> Result<AuditEntry, AuditError> {
        Err(AuditError::Storage("audit table unavailable".to_string()))
    }
}

struct Clinic {
    f: Fixture,
    audit: Arc<AuditService>,
    reports: ReportService,
    young: Patient,
    middle: Patient,
    old: Patient,
    ana: Uuid,
}

async fn add_patient_born(f: &Fixture, year: i32, month: u32, day: u32) -> Patient {
    let mut p = patient();
    p.birth_date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    f.patients.insert(p.clone()).await.unwrap();
    p
}

/// Three patients aged about 29.5, 44.8 and 59.2 on the fixed clock. The
/// young one sees Ana twice, the middle one sees Ben once, the old one never.
async fn clinic() -> Clinic {
    let f = Fixture::new();
    let audit = Arc::new(AuditService::new(f.clock.clone(), Arc::new(RandomIdGenerator)));
    let reports = ReportService::new(f.patients.clone(), f.store.clone(), audit.clone(), f.clock.clone());

    let young = add_patient_born(&f, 2000, 7, 1).await;
    let middle = add_patient_born(&f, 1985, 3, 20).await;
    let old = add_patient_born(&f, 1970, 11, 5).await;
    let ana = f.add_doctor("Ana", Specialty::Cardiologist).await;
    let ben = f.add_doctor("Ben", Specialty::Neurologist).await;

    f.seed(ana.id, young.id, at(1, 10, 0), AppointmentStatus::Scheduled).await;
    f.seed(ana.id, young.id, at(2, 10, 0), AppointmentStatus::Completed).await;
    f.seed(ben.id, middle.id, at(1, 11, 0), AppointmentStatus::Scheduled).await;

    Clinic { f, audit, reports, young, middle, old, ana: ana.id }
}

#[tokio::test]
async fn unfiltered_report_covers_everyone() {
    let c = clinic().await;
    let admin = Uuid::new_v4();

    let summary = c.reports.generate(Some(admin), &ReportRequest::default()).await.unwrap();

    assert_eq!(summary.total_patients, 3);
    assert_eq!(summary.total_appointments, 3);
    assert_eq!(summary.average_age, 44.48);
    assert_eq!(summary.generated_at, fixed_now());

    let entries = c
        .audit
        .search(&AuditQuery {
            user_id: Some(admin),
            action: Some(AuditAct::Report),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].details.starts_with("Generated report."));
}

#[tokio::test]
async fn doctor_filter_counts_distinct_patients_of_matching_appointments() {
    let c = clinic().await;

    let summary = c
        .reports
        .generate(None, &ReportRequest { doctor_id: Some(c.ana), ..Default::default() })
        .await
        .unwrap();

    assert_eq!(summary.total_appointments, 2);
    assert_eq!(summary.total_patients, 1);
    assert_eq!(summary.average_age, 29.5);

    let combined = c
        .reports
        .generate(
            None,
            &ReportRequest {
                doctor_id: Some(c.ana),
                patient_id: Some(c.young.id),
                from: Some(at(2, 0, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(combined.total_appointments, 1);
    assert_eq!(combined.total_patients, 1);
}

#[tokio::test]
async fn patient_filter_reports_that_patient_only() {
    let c = clinic().await;

    let summary = c
        .reports
        .generate(None, &ReportRequest { patient_id: Some(c.middle.id), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(summary.total_appointments, 1);
    assert_eq!(summary.total_patients, 1);
    assert_eq!(summary.average_age, 44.79);

    let without_visits = c
        .reports
        .generate(None, &ReportRequest { patient_id: Some(c.old.id), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(without_visits.total_appointments, 0);
    assert_eq!(without_visits.total_patients, 1);
    assert_eq!(without_visits.average_age, 59.16);

    let unknown = c
        .reports
        .generate(None, &ReportRequest { patient_id: Some(Uuid::new_v4()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(unknown.total_patients, 0);
    assert_eq!(unknown.average_age, 0.0);
}

#[tokio::test]
async fn date_filter_uses_appointment_search_range() {
    let c = clinic().await;

    let summary = c
        .reports
        .generate(None, &ReportRequest { to: Some(at(0, 12, 0)), ..Default::default() })
        .await
        .unwrap();

    assert_eq!(summary.total_appointments, 2);
    assert_eq!(summary.total_patients, 2);
    assert_eq!(summary.average_age, 37.15);

    let empty = c
        .reports
        .generate(None, &ReportRequest { from: Some(at(10, 0, 0)), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(empty.total_appointments, 0);
    assert_eq!(empty.total_patients, 0);
    assert_eq!(empty.average_age, 0.0);
}

#[tokio::test]
async fn audit_failure_does_not_fail_the_report() {
    let c = clinic().await;
    let reports = ReportService::new(
        c.f.patients.clone(),
        c.f.store.clone(),
        Arc::new(BrokenAudit),
        c.f.clock.clone(),
    );

    let summary = reports.generate(None, &ReportRequest::default()).await.unwrap();
    assert_eq!(summary.total_patients, 3);
}
