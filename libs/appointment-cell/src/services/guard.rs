use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use shared_config::BookingGuardMode;

/// Serialization point between the conflict check and the insert of a booking.
pub struct BookingGuard {
    mode: BookingGuardMode,
    /// One entry per doctor ever booked, never pruned; bounded by the doctor count.
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl BookingGuard {
    pub fn new(mode: BookingGuardMode) -> Self {
        Self {
            mode,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> BookingGuardMode {
        self.mode
    }

    /// Waits for the doctor's lock in `PerDoctorLock` mode. Returns `None`
    /// immediately when unguarded.
    pub async fn acquire(&self, doctor_id: Uuid) -> Option<OwnedMutexGuard<()>> {
        match self.mode {
            BookingGuardMode::Unguarded => None,
            BookingGuardMode::PerDoctorLock => {
                let lock = {
                    let mut locks = self.locks.lock().await;
                    locks.entry(doctor_id).or_default().clone()
                };
                Some(lock.lock_owned().await)
            }
        }
    }
}
