use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_utils::{generate_unique_id, Clock, IdGenerator, MAX_ID_ATTEMPTS};

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    CreateAppointmentRequest,
};
use crate::services::conflict::ConflictValidator;
use crate::services::guard::BookingGuard;
use crate::store::AppointmentStore;

/// Scheduled -> Completed, plus the record-level operations around it.
pub struct AppointmentLifecycle {
    store: Arc<dyn AppointmentStore>,
    validator: Arc<ConflictValidator>,
    guard: BookingGuard,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl AppointmentLifecycle {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        validator: Arc<ConflictValidator>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let guard = BookingGuard::new(validator.config().booking_guard);
        Self {
            store,
            validator,
            guard,
            clock,
            ids,
        }
    }

    pub async fn create(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Creating appointment for patient {} with doctor {} at {}",
            request.patient_id, request.doctor_id, request.appointment_time
        );

        // Held until the insert below completes.
        let _booking_lock = self.guard.acquire(request.doctor_id).await;

        self.validator
            .validate_booking(request.appointment_time, request.doctor_id, request.patient_id, None)
            .await?;

        let store = Arc::clone(&self.store);
        let id = generate_unique_id(self.ids.as_ref(), MAX_ID_ATTEMPTS, |candidate| {
            let store = Arc::clone(&store);
            async move {
                let existing = store.find_by_id(candidate).await?;
                Ok::<bool, AppointmentError>(existing.is_some())
            }
        })
        .await?;

        let appointment = Appointment {
            id,
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_time: request.appointment_time,
            status: AppointmentStatus::Scheduled,
            notes: request.notes,
            doctor_notes: None,
            created_at: self.clock.now(),
        };

        self.store.insert(appointment.clone()).await?;

        info!("Appointment {} scheduled with doctor {}", appointment.id, appointment.doctor_id);
        Ok(appointment)
    }

    /// Replaces the mutable fields of an existing appointment. `created_at`
    /// is kept from the stored record.
    ///
    /// The new values are not re-validated: no business-hours check, no
    /// conflict check, and any status is accepted.
    pub async fn update(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        if appointment.id.is_nil() {
            return Err(AppointmentError::InvalidArgument("Appointment id is required.".to_string()));
        }

        let existing = self
            .store
            .find_by_id(appointment.id)
            .await?
            .ok_or_else(|| AppointmentError::NotFound("Appointment not found.".to_string()))?;

        let updated = Appointment {
            id: existing.id,
            created_at: existing.created_at,
            ..appointment
        };

        self.store.replace(updated.clone()).await?;

        info!("Appointment {} updated", updated.id);
        Ok(updated)
    }

    pub async fn close(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
        doctor_notes: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        if appointment_id.is_nil() || doctor_id.is_nil() {
            return Err(AppointmentError::InvalidArgument(
                "Appointment and doctor ids are required.".to_string(),
            ));
        }

        let mut appointment = self
            .store
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| AppointmentError::NotFound("Appointment not found.".to_string()))?;

        if appointment.doctor_id != doctor_id {
            warn!("Doctor {} tried to close appointment {} they do not own", doctor_id, appointment_id);
            return Err(AppointmentError::InvalidOperation(
                "Doctor is not owner of this appointment.".to_string(),
            ));
        }

        if appointment.status != AppointmentStatus::Scheduled {
            warn!("Appointment {} is already {}", appointment_id, appointment.status);
            return Err(AppointmentError::InvalidOperation(
                "Only scheduled appointments can be closed.".to_string(),
            ));
        }

        appointment.status = AppointmentStatus::Completed;
        appointment.doctor_notes = doctor_notes;
        self.store.replace(appointment.clone()).await?;

        info!("Appointment {} completed", appointment_id);
        Ok(appointment)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppointmentError> {
        if id.is_nil() {
            return Err(AppointmentError::InvalidArgument("Appointment id is required.".to_string()));
        }

        let deleted = self.store.delete(id).await?;
        if deleted {
            info!("Appointment {} deleted", id);
        }
        Ok(deleted)
    }

    pub async fn search(
        &self,
        query: &AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if !query.has_valid_range() {
            return Err(AppointmentError::InvalidArgument(
                "From cannot be greater than To.".to_string(),
            ));
        }

        Ok(self.store.search(query).await?)
    }

    pub async fn find_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.store.find_by_patient_id(patient_id).await?)
    }
}
