//! # Stockpile Model
//!
//! Item schema and queue records for the Stockpile inventory tracker.
//!
//! This crate provides:
//! - Strongly-typed items with validated constructors
//! - Prefixed item identifiers (locally-created vs server-confirmed)
//! - Deletion tombstones for remote replay
//! - Queue records for the offline mutation queue
//!
//! No I/O happens here; the wire format is plain serde over JSON.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod id;
mod item;
mod record;

pub use error::ValidationError;
pub use id::ItemId;
pub use item::{Item, ItemDraft, ItemPatch};
pub use record::{QueueRecord, Tombstone};
