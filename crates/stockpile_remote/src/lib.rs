//! # Stockpile Remote
//!
//! Remote document store client for Stockpile.
//!
//! The persistent store is a single JSON file committed to a hosted
//! source-control repository through its REST contents API. This crate
//! provides:
//! - The content-host trait abstracting that API, plus an in-memory double
//! - A real HTTP implementation for the GitHub contents API
//! - A revision-checked whole-file store (read-SHA, mutate, write-with-SHA)
//! - Bulk upsert for draining the offline queue in one write
//! - Backup export/restore with a versioned envelope
//!
//! ## Key Invariants
//!
//! - Every write carries the most recently observed revision for the file
//! - A revision mismatch is an explicit, retryable [`RemoteError::Conflict`],
//!   never a silent overwrite
//! - The remote file being absent is an empty store, not an error

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod backup;
mod config;
mod error;
mod github;
mod store;

pub use api::{ContentHost, MemoryHost, PutPayload, RemoteFile};
pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use github::GitHubHost;
pub use store::{BulkOutcome, RemoteStore, Snapshot};
