//! User-facing inventory operations.

use crate::error::{SyncError, SyncResult};
use crate::local::LocalStore;
use crate::orchestrator::SyncOrchestrator;
use crate::status::{SyncOutcome, SyncStats, SyncStatus};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use stockpile_model::{Item, ItemDraft, ItemId, ItemPatch, QueueRecord, Tombstone};
use stockpile_remote::{ContentHost, RemoteStore};
use tracing::{info, warn};

/// How many results a search returns at most.
const SEARCH_LIMIT: usize = 10;

/// Read-only summary of the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryStats {
    /// Number of items.
    pub total_items: usize,
    /// Sum of all quantities.
    pub total_quantity: u64,
    /// Item count per group.
    pub by_group: BTreeMap<String, usize>,
    /// Item count per location.
    pub by_location: BTreeMap<String, usize>,
    /// Distinct ids with unconfirmed local changes.
    pub pending: usize,
}

/// The inventory API an application talks to.
///
/// Mutations apply optimistically to the local collection and enqueue the
/// corresponding record for the next push; everything keeps working with
/// no network. Sync triggers pass straight through to the orchestrator.
pub struct InventoryService<H: ContentHost> {
    sync: SyncOrchestrator<H>,
}

impl<H: ContentHost> InventoryService<H> {
    /// Creates a service over the given remote and local stores.
    pub fn new(remote: RemoteStore<H>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            sync: SyncOrchestrator::new(remote, local),
        }
    }

    /// Creates a service over an already-configured orchestrator.
    pub fn with_orchestrator(sync: SyncOrchestrator<H>) -> Self {
        Self { sync }
    }

    /// Loads persisted state without touching the network.
    pub fn load(&self) -> SyncResult<()> {
        self.sync.load()
    }

    /// Loads persisted state and runs the initial sync if online.
    pub fn start(&self) -> SyncResult<()> {
        self.sync.start()
    }

    /// The underlying orchestrator.
    pub fn orchestrator(&self) -> &SyncOrchestrator<H> {
        &self.sync
    }

    /// Adds a new item with a provisional local id.
    ///
    /// The id is kept verbatim through sync; the remote store never
    /// rewrites it.
    pub fn add(&self, draft: ItemDraft) -> SyncResult<Item> {
        let item = draft.into_item(ItemId::local())?;
        self.sync.commit(|items, queue| {
            items.insert(0, item.clone());
            queue.enqueue(QueueRecord::from(item.clone()));
            Ok(())
        })?;
        info!(id = %item.id, name = %item.name, "added item");
        Ok(item)
    }

    /// Applies a patch to an item and queues the updated state.
    ///
    /// An empty patch is a no-op returning the item unchanged.
    pub fn edit(&self, id: &ItemId, patch: &ItemPatch) -> SyncResult<Item> {
        let updated = self.sync.commit(|items, queue| {
            let item = items
                .iter_mut()
                .find(|i| &i.id == id)
                .ok_or_else(|| SyncError::UnknownItem(id.to_string()))?;
            if patch.is_empty() {
                return Ok(item.clone());
            }
            item.apply_patch(patch);
            queue.enqueue(QueueRecord::from(item.clone()));
            Ok(item.clone())
        })?;
        info!(id = %updated.id, "edited item");
        Ok(updated)
    }

    /// Removes an item from the collection.
    ///
    /// A tombstone is queued only when the item may exist remotely; a
    /// never-synced creation instead has its queued insert purged, so the
    /// next push cannot resurrect it.
    pub fn remove(&self, id: &ItemId) -> SyncResult<()> {
        self.sync.commit(|items, queue| {
            let pos = items
                .iter()
                .position(|i| &i.id == id)
                .ok_or_else(|| SyncError::UnknownItem(id.to_string()))?;
            let removed = items.remove(pos);
            if removed.synced || !removed.id.is_local() {
                queue.enqueue(QueueRecord::from(Tombstone::for_item(removed.id)));
            } else {
                queue.purge(&removed.id);
            }
            Ok(())
        })?;
        info!(id = %id, "removed item");
        Ok(())
    }

    /// Wipes the collection remotely and locally.
    ///
    /// A failing remote wipe degrades to a local-only wipe with a
    /// `Failed` status; the remote data would come back on the next sync.
    pub fn delete_all(&self) -> SyncResult<()> {
        if self.sync.is_online() {
            if let Err(e) = self.sync.remote().delete_all() {
                warn!(error = %e, "remote wipe failed, clearing local state only");
                self.sync.set_failed(e.to_string());
            }
        }
        self.sync.commit(|items, queue| {
            items.clear();
            queue.clear();
            Ok(())
        })?;
        info!("deleted all items");
        Ok(())
    }

    /// Exports the remote collection as a backup envelope.
    pub fn export(&self) -> SyncResult<String> {
        Ok(self.sync.remote().create_backup()?)
    }

    /// Restores the remote collection from a backup envelope, then syncs
    /// so the restored data lands locally. Returns the restored count.
    pub fn import(&self, raw: &str) -> SyncResult<usize> {
        let count = self.sync.remote().restore_from_backup(raw)?;
        self.sync.sync()?;
        Ok(count)
    }

    /// A copy of the current collection.
    pub fn list(&self) -> Vec<Item> {
        self.sync.items()
    }

    /// Case-insensitive substring search over names and details.
    pub fn search(&self, term: &str) -> Vec<Item> {
        let needle = term.trim().to_uppercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.sync
            .items()
            .into_iter()
            .filter(|item| {
                item.name.contains(&needle)
                    || item
                        .details
                        .as_deref()
                        .is_some_and(|d| d.contains(&needle))
            })
            .take(SEARCH_LIMIT)
            .collect()
    }

    /// Summarizes the collection.
    pub fn stats(&self) -> InventoryStats {
        let items = self.sync.items();
        let mut by_group: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_location: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_quantity = 0u64;
        for item in &items {
            *by_group.entry(item.group.clone()).or_default() += 1;
            *by_location.entry(item.location.clone()).or_default() += 1;
            total_quantity += u64::from(item.quantity);
        }
        InventoryStats {
            total_items: items.len(),
            total_quantity,
            by_group,
            by_location,
            pending: self.sync.pending_count(),
        }
    }

    /// Runs one sync cycle.
    pub fn sync(&self) -> SyncResult<SyncOutcome> {
        self.sync.sync()
    }

    /// Periodic driver; see [`SyncOrchestrator::tick`].
    pub fn tick(&self) -> SyncResult<Option<SyncOutcome>> {
        self.sync.tick()
    }

    /// Post-reconnect driver; see
    /// [`SyncOrchestrator::poll_network_regained`].
    pub fn poll_network_regained(&self) -> SyncResult<Option<SyncOutcome>> {
        self.sync.poll_network_regained()
    }

    /// Records a connectivity transition.
    pub fn set_online(&self, online: bool) {
        self.sync.set_online(online);
    }

    /// Current user-visible sync status.
    pub fn status(&self) -> SyncStatus {
        self.sync.status()
    }

    /// Lifetime sync counters.
    pub fn sync_stats(&self) -> SyncStats {
        self.sync.stats()
    }

    /// Timestamp of the last successful sync.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.sync.last_sync()
    }
}
