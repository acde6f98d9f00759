// =====================================================================================
// AUDIT SERVICE - APPEND-ONLY AUDIT TRAIL
// =====================================================================================

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use shared_utils::{generate_unique_id, Clock, IdGenerator, MAX_ID_ATTEMPTS};

use crate::models::{AuditEntry, AuditError, AuditEvent, AuditQuery};

/// Destination for audit events. Callers treat failures as non-fatal.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<AuditEntry, AuditError>;
}

pub struct AuditService {
    audit_buffer: Arc<RwLock<Vec<AuditEntry>>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl AuditService {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            audit_buffer: Arc::new(RwLock::new(Vec::new())),
            clock,
            ids,
        }
    }

    fn log_to_tracing(entry: &AuditEntry) {
        info!(
            event_id = %entry.id,
            action = %entry.action,
            user_id = ?entry.user_id,
            timestamp = %entry.timestamp,
            "AUDIT: {}", entry.details
        );
    }

    /// Entries matching `query`, ordered by its sort field and direction.
    pub async fn search(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditError> {
        if !query.has_valid_range() {
            return Err(AuditError::InvalidArgument(
                "From cannot be greater than To.".to_string(),
            ));
        }

        let buffer = self.audit_buffer.read().await;
        let mut entries: Vec<AuditEntry> = buffer
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();

        entries.sort_by(|a, b| query.compare(a, b));
        debug!("Audit search returned {} entries", entries.len());

        Ok(entries)
    }

    pub async fn len(&self) -> usize {
        self.audit_buffer.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.audit_buffer.read().await.is_empty()
    }
}

#[async_trait]
impl AuditSink for AuditService {
    #[instrument(skip(self, event), fields(action = %event.action))]
    async fn record(&self, event: AuditEvent) -> Result<AuditEntry, AuditError> {
        let mut buffer = self.audit_buffer.write().await;

        let id = {
            let existing: &Vec<AuditEntry> = &buffer;
            generate_unique_id(self.ids.as_ref(), MAX_ID_ATTEMPTS, |candidate| {
                let taken = existing.iter().any(|entry| entry.id == candidate);
                async move { Ok::<bool, AuditError>(taken) }
            })
            .await?
        };

        let entry = AuditEntry {
            id,
            user_id: event.user_id,
            timestamp: self.clock.now(),
            action: event.action,
            details: event.details,
        };

        Self::log_to_tracing(&entry);
        buffer.push(entry.clone());

        Ok(entry)
    }
}
