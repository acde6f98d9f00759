use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::DoctorDirectory;
use patient_cell::PatientDirectory;
use shared_config::SchedulingConfig;
use shared_utils::Clock;

use crate::models::AppointmentError;
use crate::store::AppointmentStore;

/// Half-open overlap test: `[a_start, a_end)` and `[b_start, b_end)` share an instant.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Booking rules shared by creation and doctor selection.
pub struct ConflictValidator {
    patients: Arc<dyn PatientDirectory>,
    doctors: Arc<dyn DoctorDirectory>,
    appointments: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
    config: SchedulingConfig,
}

impl ConflictValidator {
    pub fn new(
        patients: Arc<dyn PatientDirectory>,
        doctors: Arc<dyn DoctorDirectory>,
        appointments: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            patients,
            doctors,
            appointments,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Checks, in order: ids present, time in the future, patient exists,
    /// doctor exists, business hours, no overlapping scheduled appointment.
    /// The first failing check wins.
    pub async fn validate_booking(
        &self,
        appointment_time: DateTime<Utc>,
        doctor_id: Uuid,
        patient_id: Uuid,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        debug!("Validating booking for doctor {} at {}", doctor_id, appointment_time);

        if patient_id.is_nil() || doctor_id.is_nil() {
            return Err(AppointmentError::InvalidArgument(
                "Patient and doctor ids are required.".to_string(),
            ));
        }

        if appointment_time <= self.clock.now() {
            return Err(AppointmentError::InvalidTime(
                "Cannot schedule an appointment in the past.".to_string(),
            ));
        }

        if self.patients.find_by_id(patient_id).await?.is_none() {
            return Err(AppointmentError::PatientNotFound);
        }

        if self.doctors.find_by_id(doctor_id).await?.is_none() {
            return Err(AppointmentError::DoctorNotFound);
        }

        if !self.within_business_hours(appointment_time) {
            warn!("Appointment at {} is outside business hours", appointment_time);
            return Err(AppointmentError::InvalidTime(format!(
                "Appointments must start and end between {}:00 and {}:00.",
                self.config.opening_hour, self.config.closing_hour
            )));
        }

        if self.has_conflict(doctor_id, appointment_time, exclude_appointment_id).await? {
            warn!("Doctor {} is already booked at {}", doctor_id, appointment_time);
            return Err(AppointmentError::ConflictDetected);
        }

        Ok(())
    }

    /// Only the hour-of-day of the start and of the end are compared, so a
    /// session ending exactly at closing time is rejected.
    pub fn within_business_hours(&self, appointment_time: DateTime<Utc>) -> bool {
        let end_time = appointment_time + self.config.session_duration();
        let open = self.config.opening_hour;
        let close = self.config.closing_hour;

        let start_hour = appointment_time.hour();
        let end_hour = end_time.hour();

        !(start_hour < open || start_hour >= close || end_hour < open || end_hour >= close)
    }

    /// True when a scheduled appointment of `doctor_id`, other than
    /// `exclude_appointment_id`, overlaps the session starting at `appointment_time`.
    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        appointment_time: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        let duration = self.config.session_duration();
        let requested_end = appointment_time + duration;

        let existing = self.appointments.find_by_doctor_id(doctor_id).await?;

        let conflict = existing
            .iter()
            .filter(|a| a.is_scheduled())
            .filter(|a| Some(a.id) != exclude_appointment_id)
            .any(|a| intervals_overlap(appointment_time, requested_end, a.appointment_time, a.end_time(duration)));

        Ok(conflict)
    }
}
