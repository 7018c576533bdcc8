//! Local persistence for the collection, queue, and sync cursor.

use crate::error::LocalError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use stockpile_model::{Item, QueueRecord};
use tracing::warn;

const ITEMS_FILE: &str = "inventory.json";
const QUEUE_FILE: &str = "queue.json";
const LAST_SYNC_FILE: &str = "last_sync.json";

/// Durable storage for engine state between runs.
///
/// Loads are infallible in spirit: missing or corrupt state degrades to
/// an empty default with a logged warning, never a startup failure. Saves
/// report real errors.
pub trait LocalStore: Send + Sync {
    /// Loads the persisted collection.
    fn load_items(&self) -> Result<Vec<Item>, LocalError>;

    /// Persists the collection.
    fn save_items(&self, items: &[Item]) -> Result<(), LocalError>;

    /// Loads the persisted offline queue.
    fn load_queue(&self) -> Result<Vec<QueueRecord>, LocalError>;

    /// Persists the offline queue.
    fn save_queue(&self, records: &[QueueRecord]) -> Result<(), LocalError>;

    /// Loads the timestamp of the last successful sync.
    fn load_last_sync(&self) -> Result<Option<DateTime<Utc>>, LocalError>;

    /// Persists the timestamp of the last successful sync.
    fn save_last_sync(&self, at: DateTime<Utc>) -> Result<(), LocalError>;
}

/// Ephemeral in-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryLocalStore {
    items: Mutex<Vec<Item>>,
    queue: Mutex<Vec<QueueRecord>>,
    last_sync: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryLocalStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocalStore {
    fn load_items(&self) -> Result<Vec<Item>, LocalError> {
        Ok(self.items.lock().clone())
    }

    fn save_items(&self, items: &[Item]) -> Result<(), LocalError> {
        *self.items.lock() = items.to_vec();
        Ok(())
    }

    fn load_queue(&self) -> Result<Vec<QueueRecord>, LocalError> {
        Ok(self.queue.lock().clone())
    }

    fn save_queue(&self, records: &[QueueRecord]) -> Result<(), LocalError> {
        *self.queue.lock() = records.to_vec();
        Ok(())
    }

    fn load_last_sync(&self) -> Result<Option<DateTime<Utc>>, LocalError> {
        Ok(*self.last_sync.lock())
    }

    fn save_last_sync(&self, at: DateTime<Utc>) -> Result<(), LocalError> {
        *self.last_sync.lock() = Some(at);
        Ok(())
    }
}

/// File-backed store keeping three JSON files in one directory.
///
/// Writes go through a temp file and rename so a crash mid-save leaves
/// the previous state intact.
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    /// Opens (creating if needed) the state directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, LocalError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory holding the state files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, LocalError> {
        let path = self.dir.join(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(file = name, error = %e, "corrupt state file, starting from empty");
                Ok(T::default())
            }
        }
    }

    fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), LocalError> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = self.dir.join(format!("{name}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.dir.join(name))?;
        Ok(())
    }
}

impl LocalStore for FileLocalStore {
    fn load_items(&self) -> Result<Vec<Item>, LocalError> {
        self.load_json(ITEMS_FILE)
    }

    fn save_items(&self, items: &[Item]) -> Result<(), LocalError> {
        self.save_json(ITEMS_FILE, &items)
    }

    fn load_queue(&self) -> Result<Vec<QueueRecord>, LocalError> {
        self.load_json(QUEUE_FILE)
    }

    fn save_queue(&self, records: &[QueueRecord]) -> Result<(), LocalError> {
        self.save_json(QUEUE_FILE, &records)
    }

    fn load_last_sync(&self) -> Result<Option<DateTime<Utc>>, LocalError> {
        self.load_json(LAST_SYNC_FILE)
    }

    fn save_last_sync(&self, at: DateTime<Utc>) -> Result<(), LocalError> {
        self.save_json(LAST_SYNC_FILE, &Some(at))
    }
}
