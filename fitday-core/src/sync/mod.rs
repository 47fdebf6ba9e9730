//! Record synchronization for the meal plan editor.
//!
//! [`RecordSynchronizer`] keeps one daily record consistent between the
//! remote store and the local snapshot store.
//!
//! ## Load
//!
//! 1. Fetch the record from the remote store
//! 2. On success, coerce it to the slot layout and write it through to the snapshot
//! 3. On failure, serve the snapshot for the date, or an all-empty record
//!
//! ## Save
//!
//! 1. Reject non-canonical dates before any I/O
//! 2. Write the snapshot
//! 3. Update remotely; if no record exists, create it
//! 4. An update that fails outright is not retried as a create

mod guard;
mod outcome;
mod synchronizer;

pub use outcome::{LoadSource, Loaded, SaveFailure, SaveOutcome};
pub use synchronizer::RecordSynchronizer;
