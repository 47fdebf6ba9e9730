//! File-backed snapshot storage.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use super::{SnapshotError, SnapshotStore};
use crate::models::{DailyRecord, RecordDate};

const SNAPSHOT_DIR: &str = "snapshots";
const SNAPSHOT_EXT: &str = "json";

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Snapshot storage with one JSON file per date.
///
/// Writes go through a temp file, fsync and rename so a reader never sees a
/// partially written snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `<data_dir>/snapshots`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join(SNAPSHOT_DIR),
        }
    }

    /// Returns the snapshot directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path for a date, or `None` if `date` is not canonical.
    pub fn path(&self, date: &str) -> Option<PathBuf> {
        RecordDate::parse(date)
            .ok()
            .map(|date| self.dir.join(format!("{}.{}", date, SNAPSHOT_EXT)))
    }

    pub fn exists(&self, date: &str) -> bool {
        self.path(date).is_some_and(|path| path.exists())
    }

    /// Loads the snapshot for a date.
    ///
    /// Returns `Ok(None)` if no snapshot exists.
    /// Returns `Err` for other I/O or parsing errors.
    pub fn load(&self, date: &str) -> Result<Option<DailyRecord>, SnapshotError> {
        let path = self
            .path(date)
            .ok_or_else(|| SnapshotError::InvalidKey(date.to_string()))?;

        match fs::read(&path) {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes)
                    .map_err(|e| SnapshotError::Corrupt(path, e))?;
                Ok(Some(record))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapshotError::IoError(path, e)),
        }
    }

    /// Saves a snapshot, creating the snapshot directory if needed.
    pub fn save(&self, record: &DailyRecord) -> Result<(), SnapshotError> {
        let path = self
            .path(&record.date)
            .ok_or_else(|| SnapshotError::InvalidKey(record.date.clone()))?;

        fs::create_dir_all(&self.dir).map_err(|e| SnapshotError::IoError(self.dir.clone(), e))?;

        let bytes = serde_json::to_vec_pretty(record)?;
        // Each writer gets its own temp file; the rename decides the winner.
        let temp_path = self.dir.join(format!(
            ".{}.{}.{}-{}.tmp",
            record.date,
            SNAPSHOT_EXT,
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        let mut file =
            File::create(&temp_path).map_err(|e| SnapshotError::IoError(temp_path.clone(), e))?;
        file.write_all(&bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| SnapshotError::IoError(temp_path.clone(), e))?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(SnapshotError::IoError(path, e));
        }

        Ok(())
    }

    /// Lists the dates that have a snapshot, oldest first.
    pub fn dates(&self) -> Result<Vec<String>, SnapshotError> {
        let mut dates: Vec<String> = self
            .entries()?
            .into_iter()
            .map(|(date, _)| date)
            .collect();
        dates.sort();
        Ok(dates)
    }

    /// Returns the most recently written snapshot, if any.
    pub fn latest(&self) -> Result<Option<DailyRecord>, SnapshotError> {
        let newest = self
            .entries()?
            .into_iter()
            .max_by_key(|(_, modified)| *modified);

        match newest {
            Some((date, _)) => self.load(&date),
            None => Ok(None),
        }
    }

    /// Snapshot dates paired with their modification times.
    fn entries(&self) -> Result<Vec<(String, SystemTime)>, SnapshotError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SnapshotError::IoError(self.dir.clone(), e)),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| SnapshotError::IoError(self.dir.clone(), e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            let Some(date) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if RecordDate::parse(date).is_err() {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .map_err(|e| SnapshotError::IoError(path.clone(), e))?;
            entries.push((date.to_string(), modified));
        }

        Ok(entries)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, date: &str) -> Option<DailyRecord> {
        match self.load(date) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(date, error = %e, "ignoring unreadable snapshot");
                None
            }
        }
    }

    fn write(&self, record: &DailyRecord) -> Result<(), SnapshotError> {
        self.save(record)
    }
}
