//! Revision-checked whole-file store.
//!
//! The entire item collection is one JSON document; there are no partial
//! or field-level updates at the transport layer. Every write is
//! conditioned on the most recently observed revision token, so two
//! writers racing on the file get an explicit conflict instead of a
//! silent overwrite.

use crate::api::{ContentHost, PutPayload};
use crate::backup;
use crate::error::{RemoteError, RemoteResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use parking_lot::Mutex;
use stockpile_model::{Item, ItemDraft, ItemId, ItemPatch, QueueRecord};
use tracing::{debug, error, info, warn};

/// The remote item collection as of one read, together with the revision
/// token required for the next conditional write.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// All items in the remote file.
    pub items: Vec<Item>,
    /// Revision of the file, `None` when the file does not exist yet.
    pub revision: Option<String>,
}

impl Snapshot {
    /// An empty snapshot for a file that does not exist.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            revision: None,
        }
    }
}

/// Result of a bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Records inserted as new items.
    pub inserted: usize,
    /// Records merged into existing items.
    pub updated: usize,
    /// Tombstones that removed an existing item.
    pub deleted: usize,
}

/// Client for the remote document store.
///
/// Wraps a [`ContentHost`] with serialization, revision caching, and the
/// batched operations the sync engine drains the offline queue through.
/// No business logic lives here beyond validation and ID generation.
pub struct RemoteStore<H: ContentHost> {
    host: H,
    revision: Mutex<Option<String>>,
}

impl<H: ContentHost> RemoteStore<H> {
    /// Creates a store over the given host.
    pub fn new(host: H) -> Self {
        Self {
            host,
            revision: Mutex::new(None),
        }
    }

    /// Returns the underlying host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the cached revision token, if any.
    pub fn revision(&self) -> Option<String> {
        self.revision.lock().clone()
    }

    /// Fetches the current file and parses the item collection.
    ///
    /// A missing file is an empty store, not an error. Malformed transport
    /// encoding or JSON is reported as an empty collection with a logged
    /// error; the revision is still cached so the next write supersedes
    /// the unreadable content.
    pub fn read_all(&self) -> RemoteResult<Snapshot> {
        let Some(file) = self.host.fetch()? else {
            *self.revision.lock() = None;
            debug!("remote file absent, treating as empty");
            return Ok(Snapshot::empty());
        };
        *self.revision.lock() = Some(file.sha.clone());

        // Hosts chunk base64 with line breaks; strip before decoding.
        let stripped: String = file.content.split_whitespace().collect();
        let items = match BASE64.decode(stripped.as_bytes()) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Item>>(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    error!(error = %e, "remote file holds invalid JSON, treating as empty");
                    Vec::new()
                }
            },
            Err(e) => {
                error!(error = %e, "remote file holds invalid base64, treating as empty");
                Vec::new()
            }
        };

        debug!(count = items.len(), sha = %file.sha, "read remote snapshot");
        Ok(Snapshot {
            items,
            revision: Some(file.sha),
        })
    }

    /// Writes the full collection, conditioned on the last observed revision.
    ///
    /// The revision is taken from the cache, fetched on demand if the cache
    /// is cold, and omitted entirely when the file does not exist yet. On
    /// [`RemoteError::Conflict`] the cached revision is invalidated before
    /// the error propagates; the caller must re-read and retry.
    pub fn write_all(&self, items: &[Item]) -> RemoteResult<String> {
        let sha = match self.revision.lock().clone() {
            Some(sha) => Some(sha),
            None => self.host.fetch()?.map(|f| f.sha),
        };

        let json = serde_json::to_string_pretty(items)
            .map_err(|e| RemoteError::format(e.to_string()))?;
        let payload = PutPayload {
            message: format!("inventory update {}", Utc::now().to_rfc3339()),
            content: BASE64.encode(json.as_bytes()),
            sha,
        };

        match self.host.store(&payload) {
            Ok(new_sha) => {
                *self.revision.lock() = Some(new_sha.clone());
                debug!(count = items.len(), sha = %new_sha, "wrote remote snapshot");
                Ok(new_sha)
            }
            Err(err @ RemoteError::Conflict { .. }) => {
                *self.revision.lock() = None;
                warn!("write rejected by concurrent update, revision invalidated");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Applies a batch of queue records in one read-modify-write.
    ///
    /// Records are applied strictly in order, so a later entry for the same
    /// ID supersedes an earlier one within the batch. Items absent remotely
    /// are inserted at the front; items present remotely get the record's
    /// business fields merged in (remote `created_at`, and `details` when
    /// the record carries none, are preserved); tombstones remove the ID.
    /// Everything written is marked synced. An empty batch short-circuits
    /// without any network call.
    pub fn bulk_upsert(&self, records: &[QueueRecord]) -> RemoteResult<BulkOutcome> {
        if records.is_empty() {
            return Ok(BulkOutcome::default());
        }

        debug!(count = records.len(), "bulk upsert");
        let mut items = self.read_all()?.items;
        let mut outcome = BulkOutcome::default();

        for record in records {
            match record {
                QueueRecord::Item(incoming) => {
                    let now = Utc::now();
                    match items.iter_mut().find(|i| i.id == incoming.id) {
                        Some(existing) => {
                            existing.name = incoming.name.clone();
                            existing.quantity = incoming.quantity;
                            existing.group = incoming.group.clone();
                            if incoming.details.is_some() {
                                existing.details = incoming.details.clone();
                            }
                            existing.location = incoming.location.clone();
                            existing.updated_at = now;
                            existing.mark_synced();
                            outcome.updated += 1;
                        }
                        None => {
                            let mut fresh = incoming.clone();
                            fresh.updated_at = now;
                            fresh.mark_synced();
                            items.insert(0, fresh);
                            outcome.inserted += 1;
                        }
                    }
                }
                QueueRecord::Tombstone(tombstone) => {
                    if let Some(pos) = items.iter().position(|i| i.id == tombstone.id) {
                        items.remove(pos);
                        outcome.deleted += 1;
                    }
                }
            }
        }

        self.write_all(&items)?;
        info!(
            inserted = outcome.inserted,
            updated = outcome.updated,
            deleted = outcome.deleted,
            "bulk upsert committed"
        );
        Ok(outcome)
    }

    /// Writes an empty collection, superseding any concurrent change.
    ///
    /// Unlike [`write_all`](Self::write_all), a conflict here is resolved
    /// by re-reading and writing once more: the contract is unconditional.
    pub fn delete_all(&self) -> RemoteResult<()> {
        match self.write_all(&[]) {
            Ok(_) => {}
            Err(RemoteError::Conflict { .. }) => {
                self.read_all()?;
                self.write_all(&[])?;
            }
            Err(err) => return Err(err),
        }
        info!("deleted all remote items");
        Ok(())
    }

    /// Adds a single item directly to the remote store.
    ///
    /// Mints a server-confirmed ID and returns the stored item.
    pub fn add_item(&self, draft: ItemDraft) -> RemoteResult<Item> {
        let mut items = self.read_all()?.items;
        let mut item = draft.into_item(ItemId::confirmed())?;
        item.mark_synced();
        items.insert(0, item.clone());
        self.write_all(&items)?;
        Ok(item)
    }

    /// Applies a patch to a single remote item.
    pub fn update_item(&self, id: &ItemId, patch: &ItemPatch) -> RemoteResult<Item> {
        let mut items = self.read_all()?.items;
        let item = items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| RemoteError::ItemNotFound(id.to_string()))?;
        item.apply_patch(patch);
        item.mark_synced();
        let updated = item.clone();
        self.write_all(&items)?;
        Ok(updated)
    }

    /// Removes a single item from the remote store.
    pub fn delete_item(&self, id: &ItemId) -> RemoteResult<()> {
        let mut items = self.read_all()?.items;
        let pos = items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| RemoteError::ItemNotFound(id.to_string()))?;
        items.remove(pos);
        self.write_all(&items)?;
        Ok(())
    }

    /// Exports the current remote collection as a backup envelope.
    pub fn create_backup(&self) -> RemoteResult<String> {
        let snapshot = self.read_all()?;
        backup::create(&snapshot.items)
    }

    /// Restores from a backup, replacing all remote data.
    ///
    /// Records missing a required field are dropped silently; the valid
    /// subset is written wholesale. Returns the number of items written.
    pub fn restore_from_backup(&self, raw: &str) -> RemoteResult<usize> {
        let items = backup::parse(raw)?;
        info!(count = items.len(), "restoring from backup");
        self.write_all(&items)?;
        Ok(items.len())
    }
}
