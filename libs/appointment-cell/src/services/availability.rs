use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use doctor_cell::{Doctor, DoctorDirectory, Specialty};

use crate::models::AppointmentError;
use crate::services::conflict::ConflictValidator;

/// First-fit doctor selection.
pub struct AvailabilityFinder {
    doctors: Arc<dyn DoctorDirectory>,
    validator: Arc<ConflictValidator>,
}

impl AvailabilityFinder {
    pub fn new(doctors: Arc<dyn DoctorDirectory>, validator: Arc<ConflictValidator>) -> Self {
        Self { doctors, validator }
    }

    /// Returns the first doctor of `specialty`, in directory order, with no
    /// overlapping scheduled appointment at `appointment_time`. `None` means
    /// no capacity and is not an error.
    pub async fn find_available_doctor(
        &self,
        appointment_time: DateTime<Utc>,
        specialty: Specialty,
    ) -> Result<Option<Doctor>, AppointmentError> {
        let candidates = self.doctors.find_by_specialty(specialty).await?;
        debug!("Checking {} {} doctors for {}", candidates.len(), specialty, appointment_time);

        for doctor in candidates {
            if !self.validator.has_conflict(doctor.id, appointment_time, None).await? {
                info!("Doctor {} is available at {}", doctor.id, appointment_time);
                return Ok(Some(doctor));
            }
            debug!("Doctor {} is busy at {}", doctor.id, appointment_time);
        }

        Ok(None)
    }
}
