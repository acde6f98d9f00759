#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use appointment_cell::{
    Appointment, AppointmentLifecycle, AppointmentStatus, AppointmentStore, AvailabilityFinder,
    ConflictValidator, InMemoryAppointmentStore,
};
use doctor_cell::{Doctor, DoctorDirectory, InMemoryDoctorDirectory, Specialty};
use patient_cell::{InMemoryPatientDirectory, Patient, PatientDirectory};
use shared_config::{BookingGuardMode, SchedulingConfig};
use shared_utils::telemetry::init_test_tracing;
use shared_utils::test_utils::{fixed_now, manual_clock};
use shared_utils::{IdGenerator, ManualClock, RandomIdGenerator};

pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub patients: Arc<InMemoryPatientDirectory>,
    pub doctors: Arc<InMemoryDoctorDirectory>,
    pub store: Arc<dyn AppointmentStore>,
    pub validator: Arc<ConflictValidator>,
    pub lifecycle: Arc<AppointmentLifecycle>,
    pub finder: Arc<AvailabilityFinder>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(
            BookingGuardMode::PerDoctorLock,
            Arc::new(InMemoryAppointmentStore::new()),
            Arc::new(RandomIdGenerator),
        )
    }

    pub fn build(
        mode: BookingGuardMode,
        store: Arc<dyn AppointmentStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        init_test_tracing();
        let clock = manual_clock();
        let patients = Arc::new(InMemoryPatientDirectory::new());
        let doctors = Arc::new(InMemoryDoctorDirectory::new());
        let config = SchedulingConfig {
            booking_guard: mode,
            ..SchedulingConfig::default()
        };

        let validator = Arc::new(ConflictValidator::new(
            patients.clone(),
            doctors.clone(),
            store.clone(),
            clock.clone(),
            config,
        ));
        let lifecycle = Arc::new(AppointmentLifecycle::new(
            store.clone(),
            validator.clone(),
            clock.clone(),
            ids,
        ));
        let finder = Arc::new(AvailabilityFinder::new(doctors.clone(), validator.clone()));

        Self { clock, patients, doctors, store, validator, lifecycle, finder }
    }

    pub async fn add_doctor(&self, first_name: &str, specialty: Specialty) -> Doctor {
        let doctor = doctor(first_name, specialty);
        self.doctors.insert(doctor.clone()).await.unwrap();
        doctor
    }

    pub async fn add_patient(&self) -> Patient {
        let patient = patient();
        self.patients.insert(patient.clone()).await.unwrap();
        patient
    }

    /// Writes straight to the store, bypassing validation.
    pub async fn seed(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        time: DateTime<Utc>,
        status: AppointmentStatus,
    ) -> Appointment {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            appointment_time: time,
            status,
            notes: None,
            doctor_notes: None,
            created_at: fixed_now(),
        };
        self.store.insert(appointment.clone()).await.unwrap();
        appointment
    }
}

pub fn doctor(first_name: &str, specialty: Specialty) -> Doctor {
    Doctor {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: "Test".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1980, 5, 17).unwrap(),
        phone: "+10000000000".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        specialty,
        created_at: fixed_now(),
    }
}

pub fn patient() -> Patient {
    Patient {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        first_name: "Test".to_string(),
        last_name: "Patient".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        phone: "+10000000001".to_string(),
        email: "patient@example.com".to_string(),
        created_at: fixed_now(),
    }
}
