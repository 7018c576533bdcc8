//! Backup export/restore envelope.
//!
//! Backups are pretty-printed JSON with a small versioned envelope:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "exportedAt": "2024-01-01T00:00:00Z",
//!   "itemCount": 2,
//!   "data": [ ... ]
//! }
//! ```

use crate::error::{RemoteError, RemoteResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockpile_model::{Item, ItemId};
use tracing::warn;

/// Current backup envelope version.
pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    version: &'static str,
    exported_at: DateTime<Utc>,
    item_count: usize,
    data: &'a [Item],
}

/// A backup record with only the four required fields enforced.
///
/// Restores tolerate hand-edited or partial records: identity and
/// bookkeeping fields are regenerated when absent, but a record missing
/// name, quantity, group, or location is discarded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoredRecord {
    name: String,
    quantity: u32,
    group: String,
    location: String,
    #[serde(default)]
    id: Option<ItemId>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl RestoredRecord {
    fn into_item(self) -> Option<Item> {
        if self.name.trim().is_empty()
            || self.group.trim().is_empty()
            || self.location.trim().is_empty()
        {
            return None;
        }
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Some(Item {
            id: self.id.unwrap_or_else(ItemId::confirmed),
            name: self.name,
            quantity: self.quantity,
            group: self.group,
            details: self.details.filter(|d| !d.trim().is_empty()),
            location: self.location,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
            // Restored records are written wholesale right after parsing.
            synced: true,
            pending_sync: false,
        })
    }
}

/// Serializes the backup envelope for the given items.
pub fn create(items: &[Item]) -> RemoteResult<String> {
    let envelope = Envelope {
        version: BACKUP_VERSION,
        exported_at: Utc::now(),
        item_count: items.len(),
        data: items,
    };
    serde_json::to_string_pretty(&envelope).map_err(|e| RemoteError::format(e.to_string()))
}

/// Parses a backup, returning the valid records.
///
/// Fails with [`RemoteError::Format`] if the envelope itself is malformed
/// or `data` is not a sequence. Individual records missing a required
/// field are dropped silently (with a log line), never failing the whole
/// restore.
pub fn parse(raw: &str) -> RemoteResult<Vec<Item>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| RemoteError::format(format!("backup: {e}")))?;

    let data = value
        .get("data")
        .ok_or_else(|| RemoteError::format("backup: missing data field"))?;
    let entries = data
        .as_array()
        .ok_or_else(|| RemoteError::format("backup: data is not a sequence"))?;

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let restored = match serde_json::from_value::<RestoredRecord>(entry.clone()) {
            Ok(record) => record.into_item(),
            Err(_) => None,
        };
        match restored {
            Some(item) => items.push(item),
            None => warn!(index, "discarding invalid backup record"),
        }
    }
    Ok(items)
}
