use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::{generate_unique_id, Clock, IdGenerator, MAX_ID_ATTEMPTS};

use crate::models::{SessionError, SessionToken};

/// Process-lifetime token -> session map. Starts empty and is discarded with
/// the process.
///
/// Expired entries are only removed when they are looked up
/// ([`validate_session`](Self::validate_session),
/// [`get_remaining`](Self::get_remaining)) or revoked; there is no sweeper.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionToken>>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    default_ttl: Duration,
}

impl SessionStore {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, default_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            clock,
            ids,
            default_ttl,
        }
    }

    /// Default lifetime taken from `SESSION_TTL_HOURS`.
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self::new(clock, ids, config.session_ttl())
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Stores a new session for `user_id` and returns its token. `ttl`
    /// falls back to the store default.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        ttl: Option<Duration>,
    ) -> Result<Uuid, SessionError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl <= Duration::zero() {
            return Err(SessionError::InvalidTtl);
        }

        let mut sessions = self.sessions.write().await;

        let token = {
            let existing: &HashMap<Uuid, SessionToken> = &sessions;
            generate_unique_id(self.ids.as_ref(), MAX_ID_ATTEMPTS, |candidate| {
                let taken = existing.contains_key(&candidate);
                async move { Ok::<bool, SessionError>(taken) }
            })
            .await?
        };

        let now = self.clock.now();
        sessions.insert(
            token,
            SessionToken {
                token,
                user_id,
                created_at: now,
                expires_at: now + ttl,
            },
        );

        info!("Session created for user {}", user_id);
        Ok(token)
    }

    /// Owning user of a live session. An expired entry is removed and
    /// reported as absent.
    pub async fn validate_session(&self, token: Uuid) -> Option<Uuid> {
        let now = self.clock.now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&token) {
                None => return None,
                Some(session) if !session.is_expired_at(now) => return Some(session.user_id),
                Some(_) => {}
            }
        }

        self.evict_if_expired(token).await;
        None
    }

    /// Idempotent.
    pub async fn revoke_session(&self, token: Uuid) {
        if self.sessions.write().await.remove(&token).is_some() {
            info!("Session revoked");
        }
    }

    pub async fn get_remaining(&self, token: Uuid) -> Option<Duration> {
        let now = self.clock.now();
        {
            let sessions = self.sessions.read().await;
            let remaining = sessions.get(&token)?.remaining_at(now);
            if remaining > Duration::zero() {
                return Some(remaining);
            }
        }

        self.evict_if_expired(token).await;
        None
    }

    /// Entries currently held, expired-but-unvisited ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    // Re-checks under the write lock: the entry may have been replaced or
    // revoked since the read.
    async fn evict_if_expired(&self, token: Uuid) {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        if sessions.get(&token).is_some_and(|s| s.is_expired_at(now)) {
            sessions.remove(&token);
            debug!("Expired session evicted");
        }
    }
}
