//! Results of load and save operations.

use std::fmt;

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::DailyRecord;

/// Where a loaded record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Fetched from the remote store
    Remote,
    /// Remote unavailable; served from the local snapshot
    Snapshot,
    /// Remote unavailable and no snapshot; all slots empty
    Empty,
}

impl LoadSource {
    pub fn is_offline(&self) -> bool {
        !matches!(self, LoadSource::Remote)
    }
}

/// A loaded record together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub record: DailyRecord,
    pub source: LoadSource,
}

/// The remote step that failed during a save.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveFailure {
    #[error("update failed: {0}")]
    Update(GatewayError),
    #[error("create failed: {0}")]
    Create(GatewayError),
    #[error("upsert failed: {0}")]
    Upsert(GatewayError),
}

impl SaveFailure {
    pub fn gateway_error(&self) -> &GatewayError {
        match self {
            SaveFailure::Update(e) | SaveFailure::Create(e) | SaveFailure::Upsert(e) => e,
        }
    }
}

/// Result of saving a record.
///
/// Display gives the message to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// An existing remote record was replaced
    Updated,
    /// No remote record existed; one was created
    Created,
    /// The record's date is not canonical; nothing was written
    Rejected,
    /// The remote store did not accept the record; the local snapshot holds it
    Failed(SaveFailure),
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Updated | SaveOutcome::Created)
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveOutcome::Updated => write!(f, "Meal plan updated successfully!"),
            SaveOutcome::Created => write!(f, "Meal plan created successfully!"),
            SaveOutcome::Rejected => write!(f, "Invalid date format. Use YYYY-MM-DD."),
            SaveOutcome::Failed(_) => write!(f, "Failed to save the meal plan."),
        }
    }
}
