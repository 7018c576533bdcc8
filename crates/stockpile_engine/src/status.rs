//! Sync status, outcomes, and counters.

use std::fmt;

/// User-visible sync state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No network; mutations queue locally.
    Offline,
    /// A sync cycle is in flight.
    Syncing,
    /// Everything confirmed remote as of the last cycle.
    Synced,
    /// This many queued records await the next push.
    Pending(usize),
    /// The last sync cycle failed; queued work is retained.
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Offline => write!(f, "offline"),
            SyncStatus::Syncing => write!(f, "syncing"),
            SyncStatus::Synced => write!(f, "synced"),
            SyncStatus::Pending(n) => write!(f, "{n} pending"),
            SyncStatus::Failed => write!(f, "sync failed"),
        }
    }
}

/// Result of one sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another cycle was already in flight; nothing was done.
    AlreadyRunning,
    /// The engine is offline; nothing was done.
    Offline,
    /// A full cycle ran.
    Completed {
        /// Queue records confirmed by the remote store.
        pushed: usize,
        /// Items in the remote snapshot that was merged in.
        pulled: usize,
    },
}

/// Counters across the engine's lifetime.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Completed sync cycles.
    pub cycles_completed: u64,
    /// Queue records confirmed by the remote store.
    pub records_pushed: u64,
    /// Items pulled in remote snapshots.
    pub items_pulled: u64,
    /// Sync cycles that failed.
    pub failures: u64,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
}
