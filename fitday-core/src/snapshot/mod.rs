//! Local snapshot storage for offline access to daily records.
//!
//! A snapshot is the last record observed for a date, either read from the
//! remote store or saved locally. Snapshots are keyed by date, so a cached
//! copy is never served for a day it was not written for.
//!
//! # Storage Layout
//!
//! [`FileSnapshotStore`] keeps one JSON file per date:
//! - `<data_dir>/snapshots/<YYYY-MM-DD>.json`
//!
//! Both operations fail soft from the synchronizer's point of view: reads
//! treat any error as absence, and write errors are logged and swallowed by
//! the caller.

mod file_store;
mod memory_store;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::models::DailyRecord;

pub use file_store::FileSnapshotStore;
pub use memory_store::MemorySnapshotStore;

/// Persistent per-date storage of the last known record.
pub trait SnapshotStore: Send + Sync {
    /// Returns the snapshot for `date`, or `None` when it is absent or unreadable.
    fn read(&self, date: &str) -> Option<DailyRecord>;

    /// Replaces the snapshot for `record.date`.
    fn write(&self, record: &DailyRecord) -> Result<(), SnapshotError>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for Arc<T> {
    fn read(&self, date: &str) -> Option<DailyRecord> {
        (**self).read(date)
    }

    fn write(&self, record: &DailyRecord) -> Result<(), SnapshotError> {
        (**self).write(record)
    }
}

/// Errors that can occur during snapshot storage operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error for {}: {}", .0.display(), .1)]
    IoError(PathBuf, #[source] io::Error),
    #[error("Corrupt snapshot {}: {}", .0.display(), .1)]
    Corrupt(PathBuf, #[source] serde_json::Error),
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Snapshot key '{0}' is not a valid date")]
    InvalidKey(String),
    #[error("Snapshot store unavailable: {0}")]
    Unavailable(String),
}
