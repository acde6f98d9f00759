use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use patient_cell::{Patient, PatientDirectory};
use security_cell::{AuditAct, AuditEvent, AuditSink};
use shared_utils::Clock;

use crate::models::{AppointmentError, AppointmentSearchQuery, ReportRequest, ReportSummary};
use crate::store::AppointmentStore;

/// Admin statistics over patients and appointments.
pub struct ReportService {
    patients: Arc<dyn PatientDirectory>,
    appointments: Arc<dyn AppointmentStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(
        patients: Arc<dyn PatientDirectory>,
        appointments: Arc<dyn AppointmentStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            patients,
            appointments,
            audit,
            clock,
        }
    }

    /// Totals and average age. With no filter every patient counts; otherwise
    /// only the requested patient, or the patients behind the matching
    /// appointments.
    pub async fn generate(
        &self,
        actor: Option<Uuid>,
        request: &ReportRequest,
    ) -> Result<ReportSummary, AppointmentError> {
        let now = self.clock.now();

        let (patients, total_appointments) = if request.has_any_filter() {
            self.filtered(request).await?
        } else {
            let patients = self.patients.find_all().await?;
            let appointments = self.appointments.search(&AppointmentSearchQuery::default()).await?;
            (patients, appointments.len())
        };

        let summary = ReportSummary {
            total_patients: patients.len(),
            total_appointments,
            average_age: average_age(&patients, now),
            generated_at: now,
        };

        info!(
            "Generated report: {} patients, {} appointments",
            summary.total_patients, summary.total_appointments
        );
        self.safe_log(actor, describe(request)).await;

        Ok(summary)
    }

    async fn filtered(
        &self,
        request: &ReportRequest,
    ) -> Result<(Vec<Patient>, usize), AppointmentError> {
        let appointments = self.appointments.search(&request.to_search_query()).await?;
        debug!("Report filter matched {} appointments", appointments.len());

        if let Some(patient_id) = request.patient_id {
            let patients: Vec<Patient> =
                self.patients.find_by_id(patient_id).await?.into_iter().collect();
            return Ok((patients, appointments.len()));
        }

        let mut seen = HashSet::new();
        let mut patients = Vec::new();
        for appointment in &appointments {
            if !seen.insert(appointment.patient_id) {
                continue;
            }
            if let Some(patient) = self.patients.find_by_id(appointment.patient_id).await? {
                patients.push(patient);
            }
        }

        Ok((patients, appointments.len()))
    }

    async fn safe_log(&self, actor: Option<Uuid>, details: String) {
        let event = AuditEvent::new(actor, AuditAct::Report, details);
        if let Err(err) = self.audit.record(event).await {
            warn!("Failed to write report audit entry: {}", err);
        }
    }
}

fn average_age(patients: &[Patient], now: DateTime<Utc>) -> f64 {
    if patients.is_empty() {
        return 0.0;
    }
    let total: f64 = patients.iter().map(|p| p.age_in_years(now)).sum();
    let mean = total / patients.len() as f64;
    (mean * 100.0).round_ties_even() / 100.0
}

fn describe(request: &ReportRequest) -> String {
    format!(
        "Generated report. From: {:?} To: {:?} DoctorId: {:?} PatientId: {:?}",
        request.from, request.to, request.doctor_id, request.patient_id
    )
}
