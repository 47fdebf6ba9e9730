//! Day-scoped record synchronization with offline fallback.

use tracing::{debug, info, warn};

use super::guard::SaveGuard;
use super::outcome::{LoadSource, Loaded, SaveFailure, SaveOutcome};
use crate::gateway::{RecordGateway, UpdateStatus, UpsertStatus};
use crate::models::{DailyRecord, RecordDate, SlotLayout};
use crate::snapshot::SnapshotStore;

/// Loads and saves the daily record for one date at a time.
///
/// Loading is remote-first with a snapshot fallback; every successful
/// remote read is written through to the snapshot store. Saving writes the
/// snapshot first, then upserts remotely with update-then-create (or a
/// native upsert when the gateway has one).
///
/// Neither operation returns an error: expected failures (network errors,
/// missing records, corrupt snapshots) are folded into the returned record
/// or [`SaveOutcome`].
pub struct RecordSynchronizer<G, S> {
    gateway: G,
    store: S,
    layout: SlotLayout,
    guard: SaveGuard,
}

impl<G: RecordGateway, S: SnapshotStore> RecordSynchronizer<G, S> {
    pub fn new(gateway: G, store: S) -> Self {
        Self {
            gateway,
            store,
            layout: SlotLayout::default(),
            guard: SaveGuard::default(),
        }
    }

    pub fn with_layout(mut self, layout: SlotLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of dates with a load or save running or queued.
    pub fn saves_in_flight(&self) -> usize {
        self.guard.active_dates()
    }

    /// Loads the record for `date`. Never fails; see [`Self::load_with_source`].
    pub async fn load(&self, date: &str) -> DailyRecord {
        self.load_with_source(date).await.record
    }

    /// Loads the record for `date` and reports where it came from.
    ///
    /// `date` is used as an opaque key; callers validate it. A load waits for
    /// saves of the same date queued before it, so its write-through never
    /// replaces a newer saved snapshot.
    pub async fn load_with_source(&self, date: &str) -> Loaded {
        let _permit = self.guard.acquire(date).await;
        match self.gateway.fetch(date).await {
            Ok(remote) => {
                let record = self.layout.normalize(date, &remote);
                self.write_snapshot(&record);
                debug!(date, "loaded record from remote");
                Loaded {
                    record,
                    source: LoadSource::Remote,
                }
            }
            Err(e) => {
                warn!(date, error = %e, "remote fetch failed, falling back to snapshot");
                match self.store.read(date) {
                    Some(snapshot) => {
                        debug!(date, "loaded record from snapshot");
                        Loaded {
                            record: self.layout.normalize(date, &snapshot),
                            source: LoadSource::Snapshot,
                        }
                    }
                    None => {
                        debug!(date, "no snapshot, returning empty record");
                        Loaded {
                            record: self.layout.empty(date),
                            source: LoadSource::Empty,
                        }
                    }
                }
            }
        }
    }

    /// Saves `record` locally and then remotely.
    ///
    /// The record is reshaped to the slot layout. Saves for the same date
    /// run one at a time in call order.
    pub async fn save(&self, record: &DailyRecord) -> SaveOutcome {
        if let Err(e) = RecordDate::parse(&record.date) {
            warn!(error = %e, "rejecting save");
            return SaveOutcome::Rejected;
        }

        let _permit = self.guard.acquire(&record.date).await;
        let record = self.layout.normalize(record.date.as_str(), record);

        self.write_snapshot(&record);

        let outcome = if self.gateway.supports_upsert() {
            self.upsert(&record).await
        } else {
            self.update_then_create(&record).await
        };

        match &outcome {
            SaveOutcome::Failed(failure) => {
                warn!(date = %record.date, error = %failure, "save kept local only");
            }
            outcome => {
                info!(date = %record.date, ?outcome, "saved record");
            }
        }
        outcome
    }

    async fn update_then_create(&self, record: &DailyRecord) -> SaveOutcome {
        match self.gateway.update(record).await {
            Ok(UpdateStatus::Modified) => SaveOutcome::Updated,
            Ok(UpdateStatus::NotFound) => {
                debug!(date = %record.date, "no remote record, creating");
                match self.gateway.create(record).await {
                    Ok(()) => SaveOutcome::Created,
                    Err(e) => SaveOutcome::Failed(SaveFailure::Create(e)),
                }
            }
            // Unknown whether the update landed; creating now could duplicate it.
            Err(e) => SaveOutcome::Failed(SaveFailure::Update(e)),
        }
    }

    async fn upsert(&self, record: &DailyRecord) -> SaveOutcome {
        match self.gateway.upsert(record).await {
            Ok(UpsertStatus::Updated) => SaveOutcome::Updated,
            Ok(UpsertStatus::Created) => SaveOutcome::Created,
            Err(e) => SaveOutcome::Failed(SaveFailure::Upsert(e)),
        }
    }

    fn write_snapshot(&self, record: &DailyRecord) {
        if let Err(e) = self.store.write(record) {
            warn!(date = %record.date, error = %e, "failed to write snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::snapshot::{MemorySnapshotStore, SnapshotError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// In-memory remote store with switchable failures.
    #[derive(Default)]
    struct FakeRemote {
        records: Mutex<HashMap<String, DailyRecord>>,
        fetch_error: Mutex<Option<GatewayError>>,
        update_error: Mutex<Option<GatewayError>>,
        create_error: Mutex<Option<GatewayError>>,
        native_upsert: bool,
        update_delay: Duration,
        fetch_delay: Duration,
        calls: Mutex<Vec<&'static str>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        watch: Option<Arc<MemorySnapshotStore>>,
        snapshots_seen: Mutex<Vec<Option<DailyRecord>>>,
    }

    impl FakeRemote {
        fn with_record(self, record: DailyRecord) -> Self {
            self.records
                .lock()
                .unwrap()
                .insert(record.date.clone(), record);
            self
        }

        fn unreachable() -> Self {
            let remote = Self::default();
            *remote.fetch_error.lock().unwrap() =
                Some(GatewayError::Transport("connection refused".to_string()));
            remote
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn remote(&self, date: &str) -> Option<DailyRecord> {
            self.records.lock().unwrap().get(date).cloned()
        }

        fn log(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl RecordGateway for FakeRemote {
        async fn fetch(&self, date: &str) -> Result<DailyRecord, GatewayError> {
            self.log("fetch");
            if let Some(e) = self.fetch_error.lock().unwrap().clone() {
                return Err(e);
            }
            // Read first, answer later: a slow response carries the value at request time.
            let found = self.remote(date);
            tokio::time::sleep(self.fetch_delay).await;
            found.ok_or_else(|| GatewayError::Status(404, "not found".to_string()))
        }

        async fn update(&self, record: &DailyRecord) -> Result<UpdateStatus, GatewayError> {
            self.log("update");
            if let Some(store) = &self.watch {
                self.snapshots_seen
                    .lock()
                    .unwrap()
                    .push(store.read(&record.date));
            }

            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            tokio::time::sleep(self.update_delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(e) = self.update_error.lock().unwrap().clone() {
                return Err(e);
            }
            let mut records = self.records.lock().unwrap();
            match records.get_mut(&record.date) {
                Some(existing) => {
                    *existing = record.clone();
                    Ok(UpdateStatus::Modified)
                }
                None => Ok(UpdateStatus::NotFound),
            }
        }

        async fn create(&self, record: &DailyRecord) -> Result<(), GatewayError> {
            self.log("create");
            if let Some(e) = self.create_error.lock().unwrap().clone() {
                return Err(e);
            }
            let mut records = self.records.lock().unwrap();
            if records.contains_key(&record.date) {
                return Err(GatewayError::Conflict(record.date.clone()));
            }
            records.insert(record.date.clone(), record.clone());
            Ok(())
        }

        fn supports_upsert(&self) -> bool {
            self.native_upsert
        }

        async fn upsert(&self, record: &DailyRecord) -> Result<UpsertStatus, GatewayError> {
            self.log("upsert");
            let previous = self
                .records
                .lock()
                .unwrap()
                .insert(record.date.clone(), record.clone());
            Ok(match previous {
                Some(_) => UpsertStatus::Updated,
                None => UpsertStatus::Created,
            })
        }
    }

    /// Snapshot store whose writes always fail.
    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn read(&self, _date: &str) -> Option<DailyRecord> {
            None
        }

        fn write(&self, _record: &DailyRecord) -> Result<(), SnapshotError> {
            Err(SnapshotError::Unavailable("quota exceeded".to_string()))
        }
    }

    type TestSync = RecordSynchronizer<Arc<FakeRemote>, Arc<MemorySnapshotStore>>;

    fn synchronizer(remote: FakeRemote) -> (TestSync, Arc<FakeRemote>, Arc<MemorySnapshotStore>) {
        let remote = Arc::new(remote);
        let store = Arc::new(MemorySnapshotStore::new());
        let sync = RecordSynchronizer::new(Arc::clone(&remote), Arc::clone(&store));
        (sync, remote, store)
    }

    fn eggs(date: &str) -> DailyRecord {
        SlotLayout::default()
            .empty(date)
            .with_slot("meal1", "Eggs")
            .with_slot("snacks", "Almonds")
    }

    #[tokio::test]
    async fn test_load_fills_missing_slots_from_partial_remote_record() {
        let remote =
            FakeRemote::default().with_record(DailyRecord::new("2024-03-01").with_slot("meal1", "Oats"));
        let (sync, _remote, store) = synchronizer(remote);

        let loaded = sync.load_with_source("2024-03-01").await;

        assert_eq!(loaded.source, LoadSource::Remote);
        assert_eq!(loaded.record.slots.len(), 6);
        assert_eq!(loaded.record.get("meal1"), Some("Oats"));
        for name in ["meal2", "meal3", "meal4", "meal5", "snacks"] {
            assert_eq!(loaded.record.get(name), Some(""));
        }
        assert_eq!(store.read("2024-03-01"), Some(loaded.record));
    }

    #[tokio::test]
    async fn test_load_unreachable_without_snapshot_is_empty() {
        let (sync, _remote, store) = synchronizer(FakeRemote::unreachable());

        let loaded = sync.load_with_source("2024-03-01").await;

        assert_eq!(loaded.source, LoadSource::Empty);
        assert_eq!(loaded.record, SlotLayout::default().empty("2024-03-01"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_unreachable_falls_back_to_snapshot() {
        let (sync, _remote, store) = synchronizer(FakeRemote::unreachable());
        store.write(&eggs("2024-03-01")).unwrap();

        let loaded = sync.load_with_source("2024-03-01").await;

        assert_eq!(loaded.source, LoadSource::Snapshot);
        assert_eq!(loaded.record, eggs("2024-03-01"));
    }

    #[tokio::test]
    async fn test_load_not_found_remote_looks_like_empty_day() {
        let (sync, _remote, _store) = synchronizer(FakeRemote::default());

        let record = sync.load("2024-03-01").await;

        assert_eq!(record, SlotLayout::default().empty("2024-03-01"));
    }

    #[tokio::test]
    async fn test_fallback_never_serves_another_dates_snapshot() {
        let (sync, _remote, store) = synchronizer(FakeRemote::unreachable());
        store.write(&eggs("2024-02-29")).unwrap();

        let loaded = sync.load_with_source("2024-03-01").await;

        assert_eq!(loaded.source, LoadSource::Empty);
        assert!(loaded.record.is_blank());
    }

    #[tokio::test]
    async fn test_remote_load_overwrites_snapshot() {
        let remote = FakeRemote::default().with_record(eggs("2024-03-01"));
        let (sync, _remote, store) = synchronizer(remote);
        store
            .write(&DailyRecord::new("2024-03-01").with_slot("meal1", "stale"))
            .unwrap();

        let record = sync.load("2024-03-01").await;

        assert_eq!(record, eggs("2024-03-01"));
        assert_eq!(store.read("2024-03-01"), Some(record));
    }

    #[tokio::test]
    async fn test_load_uses_requested_date_over_payload_date() {
        let remote = FakeRemote::default().with_record(DailyRecord::new("2024-03-01"));
        remote
            .records
            .lock()
            .unwrap()
            .get_mut("2024-03-01")
            .unwrap()
            .date = String::new();
        let (sync, _remote, _store) = synchronizer(remote);

        let record = sync.load("2024-03-01").await;
        assert_eq!(record.date, "2024-03-01");
    }

    #[tokio::test]
    async fn test_save_creates_when_update_finds_nothing() {
        let (sync, remote, store) = synchronizer(FakeRemote::default());

        let outcome = sync.save(&eggs("2024-03-01")).await;

        assert_eq!(outcome, SaveOutcome::Created);
        assert_eq!(remote.calls(), vec!["update", "create"]);
        assert_eq!(remote.remote("2024-03-01"), Some(eggs("2024-03-01")));
        assert_eq!(store.read("2024-03-01"), Some(eggs("2024-03-01")));
    }

    #[tokio::test]
    async fn test_save_create_failure_keeps_snapshot() {
        let remote = FakeRemote::default();
        *remote.create_error.lock().unwrap() =
            Some(GatewayError::Conflict("duplicate key".to_string()));
        let (sync, remote, store) = synchronizer(remote);

        let outcome = sync.save(&eggs("2024-03-01")).await;

        assert_eq!(
            outcome,
            SaveOutcome::Failed(SaveFailure::Create(GatewayError::Conflict(
                "duplicate key".to_string()
            )))
        );
        assert_eq!(remote.calls(), vec!["update", "create"]);
        assert_eq!(store.read("2024-03-01"), Some(eggs("2024-03-01")));
    }

    #[tokio::test]
    async fn test_save_updates_existing_record() {
        let remote = FakeRemote::default().with_record(DailyRecord::new("2024-03-01"));
        let (sync, remote, _store) = synchronizer(remote);

        let outcome = sync.save(&eggs("2024-03-01")).await;

        assert_eq!(outcome, SaveOutcome::Updated);
        assert_eq!(remote.calls(), vec!["update"]);
        assert_eq!(remote.remote("2024-03-01"), Some(eggs("2024-03-01")));
    }

    #[tokio::test]
    async fn test_second_identical_save_is_update() {
        let (sync, _remote, _store) = synchronizer(FakeRemote::default());

        assert_eq!(sync.save(&eggs("2024-03-01")).await, SaveOutcome::Created);
        assert_eq!(sync.save(&eggs("2024-03-01")).await, SaveOutcome::Updated);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_date_without_io() {
        let (sync, remote, store) = synchronizer(FakeRemote::default());
        let record = DailyRecord::new("not-a-date").with_slot("meal1", "Eggs");

        let outcome = sync.save(&record).await;

        assert_eq!(outcome, SaveOutcome::Rejected);
        assert!(remote.calls().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_transport_failure_does_not_create() {
        let remote = FakeRemote::default();
        *remote.update_error.lock().unwrap() = Some(GatewayError::Timeout);
        let (sync, remote, store) = synchronizer(remote);

        let outcome = sync.save(&eggs("2024-03-01")).await;

        assert_eq!(
            outcome,
            SaveOutcome::Failed(SaveFailure::Update(GatewayError::Timeout))
        );
        assert_eq!(remote.calls(), vec!["update"]);
        assert_eq!(store.read("2024-03-01"), Some(eggs("2024-03-01")));
    }

    #[tokio::test]
    async fn test_snapshot_written_before_remote_call() {
        let store = Arc::new(MemorySnapshotStore::new());
        let remote = Arc::new(FakeRemote {
            watch: Some(Arc::clone(&store)),
            ..Default::default()
        });
        let sync = RecordSynchronizer::new(Arc::clone(&remote), Arc::clone(&store));

        sync.save(&eggs("2024-03-01")).await;

        let seen = remote.snapshots_seen.lock().unwrap().clone();
        assert_eq!(seen, vec![Some(eggs("2024-03-01"))]);
    }

    #[tokio::test]
    async fn test_snapshot_write_failure_is_swallowed() {
        let remote = Arc::new(FakeRemote::default());
        let sync = RecordSynchronizer::new(Arc::clone(&remote), BrokenStore);

        assert_eq!(sync.save(&eggs("2024-03-01")).await, SaveOutcome::Created);

        let record = sync.load("2024-03-01").await;
        assert_eq!(record, eggs("2024-03-01"));
    }

    #[tokio::test]
    async fn test_save_normalizes_to_layout() {
        let (sync, remote, store) = synchronizer(FakeRemote::default());
        let record = DailyRecord::new("2024-03-01")
            .with_slot("brunch", "Waffles")
            .with_slot("meal2", "Soup");

        sync.save(&record).await;

        let saved = store.read("2024-03-01").unwrap();
        assert_eq!(saved.slots.len(), 6);
        assert_eq!(saved.get("meal2"), Some("Soup"));
        assert_eq!(saved.get("brunch"), None);
        assert_eq!(remote.remote("2024-03-01"), Some(saved));
    }

    #[tokio::test]
    async fn test_native_upsert_replaces_two_step_protocol() {
        let remote = FakeRemote {
            native_upsert: true,
            ..Default::default()
        };
        let (sync, remote, store) = synchronizer(remote);

        assert_eq!(sync.save(&eggs("2024-03-01")).await, SaveOutcome::Created);
        assert_eq!(sync.save(&eggs("2024-03-01")).await, SaveOutcome::Updated);
        assert_eq!(remote.calls(), vec!["upsert", "upsert"]);
        assert_eq!(store.read("2024-03-01"), Some(eggs("2024-03-01")));
    }

    #[tokio::test]
    async fn test_overlapping_saves_for_same_date_run_in_order() {
        let remote = FakeRemote {
            update_delay: Duration::from_millis(30),
            ..Default::default()
        };
        let (sync, remote, store) = synchronizer(remote);
        let first = eggs("2024-03-01");
        let second = eggs("2024-03-01").with_slot("meal1", "Pancakes");

        let (a, b) = tokio::join!(sync.save(&first), sync.save(&second));

        assert_eq!(a, SaveOutcome::Created);
        assert_eq!(b, SaveOutcome::Updated);
        assert_eq!(remote.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(remote.remote("2024-03-01"), Some(second.clone()));
        assert_eq!(store.read("2024-03-01"), Some(second));
        assert_eq!(sync.saves_in_flight(), 0);
    }

    #[tokio::test]
    async fn test_slow_load_does_not_overwrite_later_save() {
        let remote = FakeRemote {
            fetch_delay: Duration::from_millis(50),
            ..Default::default()
        }
        .with_record(eggs("2024-03-01"));
        let (sync, remote, store) = synchronizer(remote);
        let edited = eggs("2024-03-01").with_slot("meal1", "Pancakes");

        let (loaded, outcome) = tokio::join!(sync.load("2024-03-01"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            sync.save(&edited).await
        });

        assert_eq!(loaded, eggs("2024-03-01"));
        assert_eq!(outcome, SaveOutcome::Updated);
        assert_eq!(remote.calls(), vec!["fetch", "update"]);
        assert_eq!(store.read("2024-03-01"), Some(edited));
        assert_eq!(sync.saves_in_flight(), 0);
    }

    #[tokio::test]
    async fn test_saves_for_different_dates_overlap() {
        let remote = FakeRemote {
            update_delay: Duration::from_millis(30),
            ..Default::default()
        };
        let (sync, remote, _store) = synchronizer(remote);
        let first = eggs("2024-03-01");
        let second = eggs("2024-03-02");

        let (a, b) = tokio::join!(sync.save(&first), sync.save(&second));

        assert_eq!(a, SaveOutcome::Created);
        assert_eq!(b, SaveOutcome::Created);
        assert_eq!(remote.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_custom_layout() {
        let layout = SlotLayout::new(["breakfast", "lunch", "dinner"]).unwrap();
        let remote = FakeRemote::default().with_record(
            DailyRecord::new("2024-03-01")
                .with_slot("lunch", "Salad")
                .with_slot("meal1", "Oats"),
        );
        let (sync, _remote, _store) = synchronizer(remote);
        let sync = sync.with_layout(layout);

        let record = sync.load("2024-03-01").await;

        let names: Vec<&str> = record.slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["breakfast", "lunch", "dinner"]);
        assert_eq!(record.get("lunch"), Some("Salad"));
    }
}
