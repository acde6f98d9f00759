use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::warn;
use uuid::Uuid;

/// Upper bound on regenerate-on-collision loops.
pub const MAX_ID_ATTEMPTS: usize = 16;

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Hands out a scripted sequence of ids, then falls back to random ones.
#[derive(Debug, Default)]
pub struct SequenceIdGenerator {
    queue: Mutex<VecDeque<Uuid>>,
}

impl SequenceIdGenerator {
    pub fn new(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            queue: Mutex::new(ids.into_iter().collect()),
        }
    }

    /// Yields `id` the given number of times.
    pub fn repeating(id: Uuid, times: usize) -> Self {
        Self::new(std::iter::repeat(id).take(times))
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&self) -> Uuid {
        let next = match self.queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or_else(Uuid::new_v4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdSpaceExhausted {
    pub attempts: usize,
}

impl std::fmt::Display for IdSpaceExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no unused id after {} attempts", self.attempts)
    }
}

impl std::error::Error for IdSpaceExhausted {}

/// Draws ids until `is_taken` reports a free one, giving up after `max_attempts`.
pub async fn generate_unique_id<F, Fut, E>(
    generator: &dyn IdGenerator,
    max_attempts: usize,
    mut is_taken: F,
) -> Result<Uuid, E>
where
    F: FnMut(Uuid) -> Fut,
    Fut: std::future::Future<Output = Result<bool, E>>,
    E: From<IdSpaceExhausted>,
{
    for attempt in 1..=max_attempts {
        let candidate = generator.next_id();
        if !is_taken(candidate).await? {
            return Ok(candidate);
        }
        warn!("Generated id {} already in use (attempt {}/{})", candidate, attempt, max_attempts);
    }

    Err(IdSpaceExhausted { attempts: max_attempts }.into())
}
