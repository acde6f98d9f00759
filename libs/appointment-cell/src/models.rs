use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::Specialty;
use shared_models::{AppError, SortDirection};
use shared_utils::IdSpaceExhausted;

// ==============================================================================
// APPOINTMENT
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub doctor_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Exclusive end of the session that starts at `appointment_time`.
    pub fn end_time(&self, session_duration: Duration) -> DateTime<Utc> {
        self.appointment_time + session_duration
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_time: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Patient-facing booking: the doctor is picked by specialty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub appointment_time: DateTime<Utc>,
    pub specialty: Specialty,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub appointment_id: Uuid,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    pub appointment_time: DateTime<Utc>,
}

// ==============================================================================
// SEARCH
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentSortField {
    #[default]
    AppointmentTime,
    Status,
    DoctorId,
    PatientId,
}

impl AppointmentSortField {
    pub fn column(&self) -> &'static str {
        match self {
            AppointmentSortField::AppointmentTime => "appointment_time",
            AppointmentSortField::Status => "status",
            AppointmentSortField::DoctorId => "doctor_id",
            AppointmentSortField::PatientId => "patient_id",
        }
    }
}

/// Filters are conjunctive. `to` keeps everything strictly before `to + 1 day`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sort_by: AppointmentSortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl AppointmentSearchQuery {
    pub fn has_valid_range(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }

    /// First instant excluded by `to`: one full day after it.
    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.to.map(|to| to + Duration::days(1))
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        if self.doctor_id.is_some_and(|id| id != appointment.doctor_id) {
            return false;
        }
        if self.patient_id.is_some_and(|id| id != appointment.patient_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != appointment.status) {
            return false;
        }
        if self.from.is_some_and(|from| appointment.appointment_time < from) {
            return false;
        }
        if self.upper_bound().is_some_and(|bound| appointment.appointment_time >= bound) {
            return false;
        }
        true
    }

    /// Sorts by the requested field, ties broken by appointment time ascending.
    pub fn sort(&self, appointments: &mut [Appointment]) {
        appointments.sort_by(|a, b| {
            let primary = match self.sort_by {
                AppointmentSortField::AppointmentTime => a.appointment_time.cmp(&b.appointment_time),
                AppointmentSortField::Status => status_rank(a.status).cmp(&status_rank(b.status)),
                AppointmentSortField::DoctorId => a.doctor_id.cmp(&b.doctor_id),
                AppointmentSortField::PatientId => a.patient_id.cmp(&b.patient_id),
            };
            self.direction
                .apply(primary)
                .then_with(|| a.appointment_time.cmp(&b.appointment_time))
        });
    }
}

fn status_rank(status: AppointmentStatus) -> u8 {
    match status {
        AppointmentStatus::Scheduled => 0,
        AppointmentStatus::Completed => 1,
    }
}

// ==============================================================================
// REPORTS
// ==============================================================================

/// Without any filter the report covers every patient and appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

impl ReportRequest {
    pub fn has_any_filter(&self) -> bool {
        self.from.is_some() || self.to.is_some() || self.doctor_id.is_some() || self.patient_id.is_some()
    }

    pub fn to_search_query(&self) -> AppointmentSearchQuery {
        AppointmentSearchQuery {
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            from: self.from,
            to: self.to,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_patients: usize,
    pub total_appointments: usize,
    /// Mean age in years, rounded to two decimals; 0 without patients.
    pub average_age: f64,
    pub generated_at: DateTime<Utc>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppointmentError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Patient not found.")]
    PatientNotFound,

    #[error("Doctor not found.")]
    DoctorNotFound,

    #[error("Doctor is not available at requested time.")]
    ConflictDetected,

    #[error("No available doctor for requested time and specialty.")]
    NoAvailableDoctor,

    #[error("{0}")]
    InvalidOperation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Could not allocate an appointment id after {0} attempts")]
    IdSpaceExhausted(usize),
}

impl From<IdSpaceExhausted> for AppointmentError {
    fn from(err: IdSpaceExhausted) -> Self {
        AppointmentError::IdSpaceExhausted(err.attempts)
    }
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        AppointmentError::DatabaseError(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::InvalidArgument(msg) | AppointmentError::InvalidTime(msg) => {
                AppError::InvalidArgument(msg)
            }
            AppointmentError::NotFound(msg) => AppError::NotFound(msg),
            AppointmentError::PatientNotFound | AppointmentError::DoctorNotFound => {
                AppError::NotFound(message)
            }
            AppointmentError::ConflictDetected | AppointmentError::NoAvailableDoctor => {
                AppError::Conflict(message)
            }
            AppointmentError::InvalidOperation(msg) => AppError::InvalidOperation(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
            AppointmentError::IdSpaceExhausted(_) => AppError::Internal(message),
        }
    }
}
