pub mod audit;
pub mod password;

pub use audit::{AuditService, AuditSink};
pub use password::PasswordSecurityService;
