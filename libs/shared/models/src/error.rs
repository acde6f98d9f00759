use serde::Serialize;
use thiserror::Error;

/// Error taxonomy shared at the boundary of every cell. Transport-level
/// mapping (status codes, response bodies) belongs to whoever hosts the cells.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidArgument(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidOperation(msg)
            | AppError::Auth(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_strips_prefix() {
        let err = AppError::NotFound("Patient not found.".to_string());
        assert_eq!(err.message(), "Patient not found.");
        assert_eq!(err.to_string(), "Not Found: Patient not found.");
        assert!(err.is_client_error());
        assert!(!AppError::Database("down".to_string()).is_client_error());
    }
}
