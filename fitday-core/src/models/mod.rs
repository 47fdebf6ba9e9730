mod daily_record;
mod record_date;
mod slot_layout;

pub(crate) use daily_record::coerce_text;
pub use daily_record::{DailyRecord, Slot};
pub use record_date::{InvalidDate, RecordDate, DATE_FORMAT};
pub use slot_layout::{slot_label, LayoutError, SlotLayout, DEFAULT_SLOTS};
