//! Sync cycle driver.

use crate::error::SyncResult;
use crate::local::LocalStore;
use crate::merge::merge;
use crate::queue::OfflineQueue;
use crate::status::{SyncOutcome, SyncStats, SyncStatus};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stockpile_model::Item;
use stockpile_remote::{ContentHost, RemoteStore};
use tracing::{debug, info, warn};

/// Wait for the connection to settle before syncing after a network
/// transition.
const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Drives sync cycles between the local collection and the remote store.
///
/// All triggers are caller-driven; nothing here spawns threads or sleeps.
/// A host application calls [`tick`](Self::tick) and
/// [`poll_network_regained`](Self::poll_network_regained) from its own
/// scheduler and [`set_online`](Self::set_online) from its connectivity
/// events.
///
/// A cycle is push-then-pull: the queued mutations go up as one batch,
/// then the full remote snapshot comes down and is merged over the local
/// collection. The queue is trimmed only after the remote confirms the
/// batch, so a failed push retries in full on the next cycle.
pub struct SyncOrchestrator<H: ContentHost> {
    remote: RemoteStore<H>,
    local: Arc<dyn LocalStore>,
    items: RwLock<Vec<Item>>,
    queue: Mutex<OfflineQueue>,
    in_flight: AtomicBool,
    online: AtomicBool,
    online_since: Mutex<Option<Instant>>,
    debounce: Duration,
    status: RwLock<SyncStatus>,
    stats: RwLock<SyncStats>,
    last_sync: RwLock<Option<DateTime<Utc>>>,
}

/// Releases the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<H: ContentHost> SyncOrchestrator<H> {
    /// Creates an orchestrator over the given remote store and local store.
    ///
    /// Starts online with empty state; call [`start`](Self::start) to load
    /// persisted state and run the initial sync.
    pub fn new(remote: RemoteStore<H>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            remote,
            local,
            items: RwLock::new(Vec::new()),
            queue: Mutex::new(OfflineQueue::new()),
            in_flight: AtomicBool::new(false),
            online: AtomicBool::new(true),
            online_since: Mutex::new(None),
            debounce: DEFAULT_DEBOUNCE,
            status: RwLock::new(SyncStatus::Synced),
            stats: RwLock::new(SyncStats::default()),
            last_sync: RwLock::new(None),
        }
    }

    /// Overrides the network-regained stability window.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Loads persisted state without touching the network.
    pub fn load(&self) -> SyncResult<()> {
        *self.items.write() = self.local.load_items()?;
        *self.queue.lock() = OfflineQueue::from_records(self.local.load_queue()?);
        *self.last_sync.write() = self.local.load_last_sync()?;
        self.refresh_status();
        Ok(())
    }

    /// Loads persisted state, then syncs once if online.
    ///
    /// A failing initial sync is logged, not fatal; queued work stays put
    /// and the next trigger retries.
    pub fn start(&self) -> SyncResult<()> {
        self.load()?;

        if self.is_online() {
            if let Err(e) = self.sync() {
                warn!(error = %e, "initial sync failed, continuing with local state");
            }
        }
        Ok(())
    }

    /// Runs one sync cycle.
    ///
    /// A concurrent call while a cycle is in flight is a silent no-op
    /// returning [`SyncOutcome::AlreadyRunning`]; the queue is never
    /// submitted twice.
    pub fn sync(&self) -> SyncResult<SyncOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync already in flight, skipping");
            return Ok(SyncOutcome::AlreadyRunning);
        }
        let _guard = InFlightGuard(&self.in_flight);

        if !self.is_online() {
            *self.status.write() = SyncStatus::Offline;
            return Ok(SyncOutcome::Offline);
        }

        *self.status.write() = SyncStatus::Syncing;
        match self.run_cycle() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(error = %e, "sync cycle failed");
                {
                    let mut stats = self.stats.write();
                    stats.failures += 1;
                    stats.last_error = Some(e.to_string());
                }
                *self.status.write() = SyncStatus::Failed;
                Err(e)
            }
        }
    }

    fn run_cycle(&self) -> SyncResult<SyncOutcome> {
        // Push phase: the queue goes up as one ordered batch.
        let records = self.queue.lock().records();
        let pushed = records.len();
        if pushed > 0 {
            self.remote.bulk_upsert(&records)?;
            let mut queue = self.queue.lock();
            queue.confirm(pushed);
            self.local.save_queue(&queue.records())?;
        }

        // Pull phase: full snapshot down, merged over local.
        let snapshot = self.remote.read_all()?;
        let pulled = snapshot.items.len();
        let merged = {
            let items = self.items.read();
            merge(&snapshot.items, &items)
        };
        self.local.save_items(&merged)?;
        *self.items.write() = merged;

        let now = Utc::now();
        self.local.save_last_sync(now)?;
        *self.last_sync.write() = Some(now);

        {
            let mut stats = self.stats.write();
            stats.cycles_completed += 1;
            stats.records_pushed += pushed as u64;
            stats.items_pulled += pulled as u64;
        }
        self.refresh_status();
        info!(pushed, pulled, "sync cycle completed");
        Ok(SyncOutcome::Completed { pushed, pulled })
    }

    /// Records a connectivity transition.
    ///
    /// Going online arms the debounce window;
    /// [`poll_network_regained`](Self::poll_network_regained) fires the
    /// sync once the connection has been stable for the whole window.
    pub fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::SeqCst);
        if online && !was {
            debug!("network regained, waiting for it to settle");
            *self.online_since.lock() = Some(Instant::now());
        } else if !online {
            *self.online_since.lock() = None;
        }
        self.refresh_status();
    }

    /// Syncs once the post-reconnect stability window has elapsed.
    ///
    /// Returns `None` while no window is armed or it has not elapsed yet.
    pub fn poll_network_regained(&self) -> SyncResult<Option<SyncOutcome>> {
        let due = {
            let mut since = self.online_since.lock();
            match *since {
                Some(at) if at.elapsed() >= self.debounce => {
                    *since = None;
                    true
                }
                _ => false,
            }
        };
        if !due {
            return Ok(None);
        }
        self.sync().map(Some)
    }

    /// Periodic driver; syncs only when online, idle, and there is queued
    /// work. Returns `None` when gated out.
    pub fn tick(&self) -> SyncResult<Option<SyncOutcome>> {
        if !self.is_online()
            || self.in_flight.load(Ordering::SeqCst)
            || self.queue.lock().is_empty()
        {
            return Ok(None);
        }
        self.sync().map(Some)
    }

    /// Whether the engine currently believes it has a network.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Current user-visible status.
    pub fn status(&self) -> SyncStatus {
        *self.status.read()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Timestamp of the last successful sync, if any.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.read()
    }

    /// A copy of the current collection.
    pub fn items(&self) -> Vec<Item> {
        self.items.read().clone()
    }

    /// Number of items in the collection.
    pub fn item_count(&self) -> usize {
        self.items.read().len()
    }

    /// Distinct ids with unconfirmed local changes (queued records plus
    /// items still flagged pending).
    pub fn pending_count(&self) -> usize {
        let queued = self.queue.lock().records();
        let items = self.items.read();
        let mut ids: std::collections::HashSet<String> = queued
            .iter()
            .map(|r| r.id().as_str().to_owned())
            .collect();
        for item in items.iter().filter(|i| i.pending_sync) {
            ids.insert(item.id.as_str().to_owned());
        }
        ids.len()
    }

    /// The remote store this orchestrator drives.
    pub fn remote(&self) -> &RemoteStore<H> {
        &self.remote
    }

    /// Applies a local mutation and persists collection and queue.
    ///
    /// Mutations are optimistic: they run even while a sync is in flight
    /// and get folded in by the next merge.
    pub(crate) fn commit<T>(
        &self,
        f: impl FnOnce(&mut Vec<Item>, &mut OfflineQueue) -> SyncResult<T>,
    ) -> SyncResult<T> {
        let value = {
            let mut items = self.items.write();
            let mut queue = self.queue.lock();
            let value = f(&mut items, &mut queue)?;
            self.local.save_items(&items)?;
            self.local.save_queue(&queue.records())?;
            value
        };
        self.refresh_status();
        Ok(value)
    }

    pub(crate) fn set_failed(&self, message: impl Into<String>) {
        let mut stats = self.stats.write();
        stats.failures += 1;
        stats.last_error = Some(message.into());
        drop(stats);
        *self.status.write() = SyncStatus::Failed;
    }

    fn refresh_status(&self) {
        let status = if !self.is_online() {
            SyncStatus::Offline
        } else {
            match self.queue.lock().len() {
                0 => SyncStatus::Synced,
                n => SyncStatus::Pending(n),
            }
        };
        *self.status.write() = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::MemoryLocalStore;
    use stockpile_model::{ItemDraft, ItemId, QueueRecord};
    use stockpile_remote::MemoryHost;

    fn orchestrator() -> SyncOrchestrator<MemoryHost> {
        SyncOrchestrator::new(
            RemoteStore::new(MemoryHost::new()),
            Arc::new(MemoryLocalStore::new()),
        )
        .with_debounce(Duration::ZERO)
    }

    fn queued_item(orch: &SyncOrchestrator<MemoryHost>, id: &str, name: &str) {
        let item = ItemDraft::new(name, 5, "G", "L")
            .into_item(ItemId::from(id))
            .unwrap();
        orch.commit(|items, queue| {
            items.insert(0, item.clone());
            queue.enqueue(QueueRecord::from(item));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn offline_sync_is_a_no_op() {
        let orch = orchestrator();
        orch.set_online(false);
        queued_item(&orch, "local_1", "BOLT");

        assert_eq!(orch.sync().unwrap(), SyncOutcome::Offline);
        assert_eq!(orch.pending_count(), 1);
        assert_eq!(orch.status(), SyncStatus::Offline);
        assert_eq!(orch.remote().host().store_calls(), 0);
    }

    #[test]
    fn queued_creation_survives_the_cycle_with_its_id() {
        let orch = orchestrator();
        queued_item(&orch, "local_1", "BOLT");
        assert_eq!(orch.status(), SyncStatus::Pending(1));

        let outcome = orch.sync().unwrap();
        assert_eq!(outcome, SyncOutcome::Completed { pushed: 1, pulled: 1 });

        let items = orch.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "local_1");
        assert!(items[0].synced);
        assert!(!items[0].pending_sync);
        assert_eq!(orch.pending_count(), 0);
        assert_eq!(orch.status(), SyncStatus::Synced);
    }

    #[test]
    fn failed_push_keeps_the_queue_and_reports_failed() {
        let orch = orchestrator();
        queued_item(&orch, "local_1", "BOLT");
        orch.remote().host().fail_next_fetch("connection reset");

        let err = orch.sync().unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(orch.status(), SyncStatus::Failed);
        assert_eq!(orch.stats().failures, 1);

        // Next sync replays the same batch successfully.
        let outcome = orch.sync().unwrap();
        assert_eq!(outcome, SyncOutcome::Completed { pushed: 1, pulled: 1 });
    }

    #[test]
    fn tick_is_gated_on_queued_work() {
        let orch = orchestrator();
        assert_eq!(orch.tick().unwrap(), None);

        queued_item(&orch, "local_1", "BOLT");
        assert!(matches!(
            orch.tick().unwrap(),
            Some(SyncOutcome::Completed { .. })
        ));
        assert_eq!(orch.tick().unwrap(), None);

        orch.set_online(false);
        queued_item(&orch, "local_2", "NUT");
        assert_eq!(orch.tick().unwrap(), None);
    }

    #[test]
    fn network_regained_debounce_fires_once() {
        let orch = orchestrator();
        orch.set_online(false);
        assert_eq!(orch.poll_network_regained().unwrap(), None);

        orch.set_online(true);
        // Zero debounce in tests: due immediately, and only once.
        assert!(matches!(
            orch.poll_network_regained().unwrap(),
            Some(SyncOutcome::Completed { .. })
        ));
        assert_eq!(orch.poll_network_regained().unwrap(), None);
    }

    #[test]
    fn long_debounce_defers_the_sync() {
        let orch = SyncOrchestrator::new(
            RemoteStore::new(MemoryHost::new()),
            Arc::new(MemoryLocalStore::new()),
        )
        .with_debounce(Duration::from_secs(3600));

        orch.set_online(false);
        orch.set_online(true);
        assert_eq!(orch.poll_network_regained().unwrap(), None);
        assert_eq!(orch.remote().host().fetch_calls(), 0);
    }

    #[test]
    fn start_restores_persisted_state() {
        let local = Arc::new(MemoryLocalStore::new());
        let item = ItemDraft::new("BOLT", 5, "G", "L")
            .into_item(ItemId::from("local_1"))
            .unwrap();
        local.save_items(std::slice::from_ref(&item)).unwrap();
        local
            .save_queue(&[QueueRecord::from(item.clone())])
            .unwrap();

        let orch = SyncOrchestrator::new(RemoteStore::new(MemoryHost::new()), local.clone())
            .with_debounce(Duration::ZERO);
        orch.start().unwrap();

        // Initial sync pushed the restored queue and confirmed the item.
        let items = orch.items();
        assert_eq!(items.len(), 1);
        assert!(items[0].synced);
        assert!(local.load_queue().unwrap().is_empty());
        assert!(orch.last_sync().is_some());
    }
}
