//! Fitday Core Library
//!
//! Daily meal plan records kept in sync with a remote store, with per-date
//! local snapshots for offline use, plus the exercise catalog client.

pub mod catalog;
pub mod editor;
pub mod gateway;
pub mod models;
pub mod snapshot;
pub mod sync;

pub use catalog::{paginate, BodyPart, CatalogError, CatalogOptions, Exercise, ExerciseCatalog, Page};
pub use editor::{EditorError, PlanEditor};
pub use gateway::{
    GatewayError, HttpGatewayOptions, HttpRecordGateway, OfflineGateway, RecordGateway,
    UpdateStatus, UpsertStatus,
};
pub use models::{DailyRecord, InvalidDate, LayoutError, RecordDate, Slot, SlotLayout};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore};
pub use sync::{LoadSource, Loaded, RecordSynchronizer, SaveFailure, SaveOutcome};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
