use std::fmt;

use std::cmp::Ordering;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::{AppError, SortDirection};
use shared_utils::IdSpaceExhausted;

// =====================================================================================
// AUDIT MODELS
// =====================================================================================

/// Area of the system an audit entry belongs to. Sorting follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAct {
    Auth,
    User,
    Patient,
    Doctor,
    Appointment,
    Report,
}

impl fmt::Display for AuditAct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditAct::Auth => "auth",
            AuditAct::User => "user",
            AuditAct::Patient => "patient",
            AuditAct::Doctor => "doctor",
            AuditAct::Appointment => "appointment",
            AuditAct::Report => "report",
        };
        f.write_str(name)
    }
}

/// What a caller reports; id and timestamp are assigned on record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub user_id: Option<Uuid>,
    pub action: AuditAct,
    pub details: String,
}

impl AuditEvent {
    pub fn new(user_id: Option<Uuid>, action: AuditAct, details: impl Into<String>) -> Self {
        Self {
            user_id,
            action,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAct,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSortField {
    #[default]
    Timestamp,
    UserId,
    Action,
}

#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub user_id: Option<Uuid>,
    pub action: Option<AuditAct>,
    pub from: Option<DateTime<Utc>>,
    /// Covers the whole calendar day of `to`, whatever its time of day.
    pub to: Option<DateTime<Utc>>,
    pub sort_by: AuditSortField,
    pub sort: SortDirection,
}

impl AuditQuery {
    pub fn has_valid_range(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }

    /// Midnight after the calendar day of `to`.
    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.to
            .map(|to| (to.date_naive() + Duration::days(1)).and_time(NaiveTime::MIN).and_utc())
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.user_id.map_or(true, |id| entry.user_id == Some(id))
            && self.action.map_or(true, |action| entry.action == action)
            && self.from.map_or(true, |from| entry.timestamp >= from)
            && self.upper_bound().map_or(true, |bound| entry.timestamp < bound)
    }

    /// Orders by the requested field, ties broken by timestamp ascending.
    pub fn compare(&self, a: &AuditEntry, b: &AuditEntry) -> Ordering {
        let primary = match self.sort_by {
            AuditSortField::Timestamp => a.timestamp.cmp(&b.timestamp),
            AuditSortField::UserId => a.user_id.cmp(&b.user_id),
            AuditSortField::Action => a.action.cmp(&b.action),
        };
        self.sort
            .apply(primary)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    }
}

// =====================================================================================
// ERRORS
// =====================================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Could not allocate an audit id after {0} attempts")]
    IdSpaceExhausted(usize),

    #[error("Audit storage error: {0}")]
    Storage(String),
}

impl From<IdSpaceExhausted> for AuditError {
    fn from(err: IdSpaceExhausted) -> Self {
        AuditError::IdSpaceExhausted(err.attempts)
    }
}

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            AuditError::IdSpaceExhausted(_) => AppError::Internal(err.to_string()),
            AuditError::Storage(msg) => AppError::Database(msg),
        }
    }
}
