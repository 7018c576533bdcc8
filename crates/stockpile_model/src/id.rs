//! Item identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix for items created locally and not yet confirmed by the remote store.
const LOCAL_PREFIX: &str = "local_";
/// Prefix for items minted during a direct remote write.
const CONFIRMED_PREFIX: &str = "item_";

/// Unique identifier for an inventory item.
///
/// IDs are prefixed strings so a reader can tell where a record was born:
/// `local_*` for device-created items that have never been pushed, `item_*`
/// for items minted on a direct remote write. Sync never rewrites an ID;
/// a `local_*` item keeps its ID after it reaches the remote store.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new locally-generated ID.
    #[must_use]
    pub fn local() -> Self {
        Self(format!("{}{}", LOCAL_PREFIX, Uuid::new_v4().simple()))
    }

    /// Creates a new server-confirmed ID.
    #[must_use]
    pub fn confirmed() -> Self {
        Self(format!("{}{}", CONFIRMED_PREFIX, Uuid::new_v4().simple()))
    }

    /// Returns true if this ID was generated locally (never confirmed).
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    /// Returns the ID as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
