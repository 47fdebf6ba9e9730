use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use super::slot_layout::slot_label;

/// One named free-text field of a daily record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub value: String,
}

/// The meal plan entry for one calendar day.
///
/// The date is the record's identity. It is kept as text so that a
/// malformed date can still be handed to the synchronizer and rejected there.
///
/// On the wire and on disk a record is one flat JSON object:
///
/// ```json
/// {"date": "2024-03-01", "meal1": "Oats", "meal2": "", "snacks": "Apple"}
/// ```
///
/// Reading coerces every slot to text: `null` becomes empty text, numbers and
/// booleans become their JSON text, nested arrays and objects become empty
/// text. A missing `date` reads as empty text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailyRecord {
    pub date: String,
    pub slots: Vec<Slot>,
}

impl DailyRecord {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            slots: Vec::new(),
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the value of a slot, or `None` if the record has no such slot.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.value.as_str())
    }

    /// Sets a slot, replacing an existing value or appending a new slot.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.slots.iter_mut().find(|slot| slot.name == name) {
            Some(slot) => slot.value = value,
            None => self.slots.push(Slot { name, value }),
        }
    }

    /// True when every slot is empty text.
    pub fn is_blank(&self) -> bool {
        self.slots.iter().all(|slot| slot.value.is_empty())
    }
}

impl fmt::Display for DailyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Meal plan for {}", self.date);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;

        for slot in &self.slots {
            let value = if slot.value.is_empty() {
                "-"
            } else {
                slot.value.as_str()
            };
            writeln!(f, "{}: {}", slot_label(&slot.name), value)?;
        }

        Ok(())
    }
}

/// Coerces a JSON value to slot text.
pub(crate) fn coerce_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

impl Serialize for DailyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len() + 1))?;
        map.serialize_entry("date", &self.date)?;
        for slot in &self.slots {
            map.serialize_entry(&slot.name, &slot.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DailyRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = DailyRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of slot names to text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<DailyRecord, A::Error> {
                let mut record = DailyRecord::default();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    if key == "date" {
                        record.date = coerce_text(value);
                    } else {
                        record.set(key, coerce_text(value));
                    }
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
