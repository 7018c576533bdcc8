//! # Stockpile Engine
//!
//! Offline-first engine tying the local collection to the remote store.
//!
//! This crate provides:
//! - Offline mutation queue (ordered, replayed in one batch)
//! - Local persistence (memory and file-backed)
//! - Remote-wins reconciliation merge
//! - Sync orchestrator with caller-driven triggers
//! - User-facing inventory service
//!
//! ## Architecture
//!
//! The engine implements a **push-then-pull** synchronization model:
//! 1. Drain the offline queue into one bulk upsert (remote confirms first)
//! 2. Read the full remote snapshot
//! 3. Merge it over the local collection (remote wins per id)
//!
//! All triggers are caller-driven; the engine spawns no threads and pulls
//! in no async runtime. A host application drives `tick()` and
//! `poll_network_regained()` from whatever scheduler it already has.
//!
//! ## Key Invariants
//!
//! - The queue is cleared only after the remote confirms the batch
//! - The collection is replaced only after a successful merge
//! - At most one sync cycle is in flight at a time
//! - Local mutations stay available offline and survive restarts

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod inventory;
mod local;
mod merge;
mod orchestrator;
mod queue;
mod status;

pub use error::{LocalError, SyncError, SyncResult};
pub use inventory::{InventoryService, InventoryStats};
pub use local::{FileLocalStore, LocalStore, MemoryLocalStore};
pub use merge::merge;
pub use orchestrator::SyncOrchestrator;
pub use queue::OfflineQueue;
pub use status::{SyncOutcome, SyncStats, SyncStatus};
