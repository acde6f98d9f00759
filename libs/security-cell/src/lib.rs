// =====================================================================================
// SECURITY CELL - AUDIT TRAIL & PASSWORD HANDLING
// =====================================================================================
//
// - Append-only audit log with structured tracing output and search
// - Argon2 password hashing and verification
//
// =====================================================================================

pub mod models;
pub mod services;

pub use models::{AuditAct, AuditEntry, AuditError, AuditEvent, AuditQuery, AuditSortField};
pub use services::{AuditService, AuditSink, PasswordSecurityService};
