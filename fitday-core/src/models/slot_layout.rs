use std::collections::HashSet;
use thiserror::Error;

use super::daily_record::{DailyRecord, Slot};

/// Slot names used when no layout is configured: five meals and snacks.
pub const DEFAULT_SLOTS: [&str; 6] = ["meal1", "meal2", "meal3", "meal4", "meal5", "snacks"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Slot layout must name at least one slot")]
    Empty,
    #[error("Slot names must not be blank")]
    Blank,
    #[error("Duplicate slot name '{0}'")]
    Duplicate(String),
    #[error("'{0}' is reserved and cannot be used as a slot name")]
    Reserved(String),
}

/// The ordered, fixed set of slots every daily record carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    names: Vec<String>,
}

impl SlotLayout {
    pub fn new<I, S>(names: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut seen = HashSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err(LayoutError::Blank);
            }
            if name == "date" {
                return Err(LayoutError::Reserved(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(LayoutError::Duplicate(name.clone()));
            }
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// A record for `date` with every slot set to empty text.
    pub fn empty(&self, date: impl Into<String>) -> DailyRecord {
        DailyRecord {
            date: date.into(),
            slots: self
                .names
                .iter()
                .map(|name| Slot {
                    name: name.clone(),
                    value: String::new(),
                })
                .collect(),
        }
    }

    /// Reshapes `record` to exactly this layout under `date`.
    ///
    /// Slots come out in layout order; slots the record lacks are empty text
    /// and slots the layout does not name are dropped.
    pub fn normalize(&self, date: impl Into<String>, record: &DailyRecord) -> DailyRecord {
        DailyRecord {
            date: date.into(),
            slots: self
                .names
                .iter()
                .map(|name| Slot {
                    name: name.clone(),
                    value: record.get(name).unwrap_or_default().to_string(),
                })
                .collect(),
        }
    }
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self {
            names: DEFAULT_SLOTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Human-readable label for a slot name: `meal1` -> `Meal 1`, `snacks` -> `Snacks`.
pub fn slot_label(name: &str) -> String {
    let split = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (word, number) = name.split_at(split);

    let mut label = String::with_capacity(name.len() + 1);
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        label.extend(first.to_uppercase());
        label.push_str(chars.as_str());
    }
    if !number.is_empty() {
        if !label.is_empty() {
            label.push(' ');
        }
        label.push_str(number);
    }
    label
}
