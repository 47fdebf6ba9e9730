//! Remote record gateway.
//!
//! The gateway is the only component that talks to the remote store. It
//! exposes fetch, update and create for a single date; the synchronizer
//! decides how to combine them.
//!
//! ## Update Semantics
//!
//! `update` distinguishes two kinds of "no": [`UpdateStatus::NotFound`] means
//! the store answered and has no record for the date, which is safe to follow
//! with `create`. An `Err` means the outcome is unknown and must not be
//! retried as a create.

mod error;
mod http;

use std::future::Future;
use std::sync::Arc;

use crate::models::DailyRecord;

pub use error::GatewayError;
pub use http::{HttpGatewayOptions, HttpRecordGateway, RECORD_PATH};

/// Result of an update attempt that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// A record existed and was replaced
    Modified,
    /// No record exists for the date
    NotFound,
}

/// Result of a native upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStatus {
    Updated,
    Created,
}

/// Access to the remote record store.
pub trait RecordGateway: Send + Sync {
    /// Fetches the record stored for `date`.
    fn fetch(&self, date: &str) -> impl Future<Output = Result<DailyRecord, GatewayError>> + Send;

    /// Replaces the record for `record.date` if one exists.
    fn update(
        &self,
        record: &DailyRecord,
    ) -> impl Future<Output = Result<UpdateStatus, GatewayError>> + Send;

    /// Creates the record for `record.date`.
    fn create(&self, record: &DailyRecord) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// True when [`RecordGateway::upsert`] is a single idempotent call.
    fn supports_upsert(&self) -> bool {
        false
    }

    /// Creates or replaces the record for `record.date` in one call.
    fn upsert(
        &self,
        _record: &DailyRecord,
    ) -> impl Future<Output = Result<UpsertStatus, GatewayError>> + Send {
        async { Err(GatewayError::Unsupported) }
    }
}

impl<T: RecordGateway> RecordGateway for Arc<T> {
    fn fetch(&self, date: &str) -> impl Future<Output = Result<DailyRecord, GatewayError>> + Send {
        (**self).fetch(date)
    }

    fn update(
        &self,
        record: &DailyRecord,
    ) -> impl Future<Output = Result<UpdateStatus, GatewayError>> + Send {
        (**self).update(record)
    }

    fn create(&self, record: &DailyRecord) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).create(record)
    }

    fn supports_upsert(&self) -> bool {
        (**self).supports_upsert()
    }

    fn upsert(
        &self,
        record: &DailyRecord,
    ) -> impl Future<Output = Result<UpsertStatus, GatewayError>> + Send {
        (**self).upsert(record)
    }
}

/// Gateway used when no remote store is configured.
///
/// Every call fails with [`GatewayError::NotConfigured`], so loads come from
/// local snapshots and saves stay local.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGateway;

impl RecordGateway for OfflineGateway {
    async fn fetch(&self, _date: &str) -> Result<DailyRecord, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn update(&self, _record: &DailyRecord) -> Result<UpdateStatus, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn create(&self, _record: &DailyRecord) -> Result<(), GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}
