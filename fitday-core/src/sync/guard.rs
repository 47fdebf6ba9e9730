//! Per-date serialization of loads and saves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one permit per date at a time, shared by loads and saves.
///
/// A second operation on a date waits until the first one finishes; those for
/// different dates proceed independently. Permits are granted in request
/// order (tokio's mutex is fair).
#[derive(Debug, Default)]
pub(crate) struct SaveGuard {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SaveGuard {
    pub(crate) async fn acquire(&self, date: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries held only by the map have no pending or running save.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(date.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of dates with a save running or queued.
    pub(crate) fn active_dates(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}
