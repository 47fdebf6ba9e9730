//! Editor state for a single day's meal plan.

use thiserror::Error;

use crate::gateway::RecordGateway;
use crate::models::{DailyRecord, RecordDate, SlotLayout};
use crate::snapshot::SnapshotStore;
use crate::sync::{LoadSource, RecordSynchronizer, SaveOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Unknown slot '{slot}'. Valid slots: {valid}")]
    UnknownSlot { slot: String, valid: String },
}

/// The editable fields of one day's record.
///
/// Every slot of the layout always holds text, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEditor {
    date: String,
    layout: SlotLayout,
    values: Vec<String>,
}

impl PlanEditor {
    pub fn new(layout: SlotLayout, date: impl Into<String>) -> Self {
        let values = vec![String::new(); layout.len()];
        Self {
            date: date.into(),
            layout,
            values,
        }
    }

    /// An editor for today's date.
    pub fn for_today(layout: SlotLayout) -> Self {
        Self::new(layout, RecordDate::today().to_string())
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.index_of(slot).map(|i| self.values[i].as_str())
    }

    pub fn set(&mut self, slot: &str, value: impl Into<String>) -> Result<(), EditorError> {
        let index = self.index_of(slot).ok_or_else(|| EditorError::UnknownSlot {
            slot: slot.to_string(),
            valid: self.layout.names().collect::<Vec<_>>().join(", "),
        })?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Slot names paired with their current values, in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.layout
            .names()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Replaces every field with the record's values; missing slots become empty.
    pub fn populate(&mut self, record: &DailyRecord) {
        for (value, name) in self.values.iter_mut().zip(self.layout.names()) {
            *value = record.get(name).unwrap_or_default().to_string();
        }
    }

    pub fn to_record(&self) -> DailyRecord {
        let mut record = DailyRecord::new(self.date.clone());
        for (name, value) in self.fields() {
            record.set(name, value);
        }
        record
    }

    /// Loads this editor's date through the synchronizer and fills the fields.
    pub async fn activate<G, S>(&mut self, sync: &RecordSynchronizer<G, S>) -> LoadSource
    where
        G: RecordGateway,
        S: SnapshotStore,
    {
        let loaded = sync.load_with_source(&self.date).await;
        self.populate(&loaded.record);
        loaded.source
    }

    /// Saves the current fields through the synchronizer.
    pub async fn submit<G, S>(&self, sync: &RecordSynchronizer<G, S>) -> SaveOutcome
    where
        G: RecordGateway,
        S: SnapshotStore,
    {
        sync.save(&self.to_record()).await
    }

    fn index_of(&self, slot: &str) -> Option<usize> {
        self.layout.names().position(|name| name == slot)
    }
}
