use std::collections::HashMap;
use std::sync::Mutex;

use super::{SnapshotError, SnapshotStore};
use crate::models::DailyRecord;

/// In-process snapshot storage. Contents do not survive the process.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    records: Mutex<HashMap<String, DailyRecord>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dates holding a snapshot.
    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self, date: &str) -> Option<DailyRecord> {
        self.records.lock().ok()?.get(date).cloned()
    }

    fn write(&self, record: &DailyRecord) -> Result<(), SnapshotError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| SnapshotError::Unavailable(e.to_string()))?;
        records.insert(record.date.clone(), record.clone());
        Ok(())
    }
}
