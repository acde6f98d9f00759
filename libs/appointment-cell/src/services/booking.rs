use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use doctor_cell::DoctorDirectory;
use patient_cell::PatientDirectory;
use security_cell::{AuditAct, AuditEvent, AuditSink};

use crate::models::{
    Appointment, AppointmentError, BookAppointmentRequest, BookingConfirmation,
    CreateAppointmentRequest,
};
use crate::services::availability::AvailabilityFinder;
use crate::services::lifecycle::AppointmentLifecycle;

/// Caller-facing booking flow: resolves profiles from user ids and records
/// every outcome in the audit log.
pub struct BookingService {
    patients: Arc<dyn PatientDirectory>,
    doctors: Arc<dyn DoctorDirectory>,
    finder: Arc<AvailabilityFinder>,
    lifecycle: Arc<AppointmentLifecycle>,
    audit: Arc<dyn AuditSink>,
}

impl BookingService {
    pub fn new(
        patients: Arc<dyn PatientDirectory>,
        doctors: Arc<dyn DoctorDirectory>,
        finder: Arc<AvailabilityFinder>,
        lifecycle: Arc<AppointmentLifecycle>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            patients,
            doctors,
            finder,
            lifecycle,
            audit,
        }
    }

    pub async fn book(
        &self,
        user_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let result = self.try_book(user_id, request).await;

        let details = match &result {
            Ok(confirmation) => format!(
                "Booked appointment {} with Dr. {} {} at {}",
                confirmation.appointment_id,
                confirmation.doctor_first_name,
                confirmation.doctor_last_name,
                confirmation.appointment_time
            ),
            Err(err) => format!("Booking failed: {}", err),
        };
        self.safe_log(user_id, details).await;

        result
    }

    async fn try_book(
        &self,
        user_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let patient = self
            .patients
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppointmentError::NotFound("Patient profile not found.".to_string()))?;

        let doctor = self
            .finder
            .find_available_doctor(request.appointment_time, request.specialty)
            .await?
            .ok_or(AppointmentError::NoAvailableDoctor)?;

        let appointment = self
            .lifecycle
            .create(CreateAppointmentRequest {
                patient_id: patient.id,
                doctor_id: doctor.id,
                appointment_time: request.appointment_time,
                notes: request.notes,
            })
            .await?;

        info!("Patient {} booked appointment {}", patient.id, appointment.id);

        Ok(BookingConfirmation {
            appointment_id: appointment.id,
            doctor_first_name: doctor.first_name,
            doctor_last_name: doctor.last_name,
            appointment_time: appointment.appointment_time,
        })
    }

    pub async fn close(
        &self,
        user_id: Uuid,
        appointment_id: Uuid,
        doctor_notes: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let result = self.try_close(user_id, appointment_id, doctor_notes).await;

        let details = match &result {
            Ok(appointment) => format!("Closed appointment {}", appointment.id),
            Err(err) => format!("Closing appointment {} failed: {}", appointment_id, err),
        };
        self.safe_log(user_id, details).await;

        result
    }

    async fn try_close(
        &self,
        user_id: Uuid,
        appointment_id: Uuid,
        doctor_notes: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let doctor = self
            .doctors
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppointmentError::NotFound("Doctor profile not found.".to_string()))?;

        self.lifecycle.close(appointment_id, doctor.id, doctor_notes).await
    }

    async fn safe_log(&self, user_id: Uuid, details: String) {
        let event = AuditEvent::new(Some(user_id), AuditAct::Appointment, details);
        if let Err(err) = self.audit.record(event).await {
            warn!("Failed to write audit entry for user {}: {}", user_id, err);
        }
    }
}
