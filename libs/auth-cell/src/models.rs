use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::Specialty;
use shared_models::{AppError, Role, User};
use shared_utils::IdSpaceExhausted;

/// One live session. Owned exclusively by [`crate::SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A user together with its credential. Never handed out of the auth cell.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub phone: String,
    pub role: Role,
    /// Doctors only; defaults to general practice.
    pub specialty: Option<Specialty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    pub token: Uuid,
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Session lifetime must be positive")]
    InvalidTtl,

    #[error("Could not allocate a session token after {0} attempts")]
    IdSpaceExhausted(usize),
}

impl From<IdSpaceExhausted> for SessionError {
    fn from(err: IdSpaceExhausted) -> Self {
        SessionError::IdSpaceExhausted(err.attempts)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl From<IdSpaceExhausted> for AuthError {
    fn from(err: IdSpaceExhausted) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            AuthError::Conflict(msg) => AppError::Conflict(msg),
            AuthError::Unauthorized(msg) => AppError::Auth(msg),
            AuthError::DatabaseError(msg) => AppError::Database(msg),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
