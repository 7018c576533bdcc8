//! Inventory item schema.

use crate::error::ValidationError;
use crate::id::ItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single inventory record.
///
/// Items are serialized camelCase into the remote JSON document. The two
/// sync flags track where an item stands relative to the remote store:
/// `synced` means this exact state has been written remotely, `pending_sync`
/// means the item sits in the offline queue waiting for a push. The intended
/// steady state is `pending_sync == !synced`; transient staleness between a
/// push and the following merge is tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Globally unique identifier.
    pub id: ItemId,
    /// Item name, trimmed and uppercased at construction.
    pub name: String,
    /// Non-negative stock count.
    pub quantity: u32,
    /// Grouping label (e.g. "FASTENERS").
    pub group: String,
    /// Optional free-form details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Physical location label.
    pub location: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Whether this exact state has been written to the remote store.
    pub synced: bool,
    /// Whether this item is queued for a future push.
    pub pending_sync: bool,
}

impl Item {
    /// Marks the item as confirmed by the remote store.
    pub fn mark_synced(&mut self) {
        self.synced = true;
        self.pending_sync = false;
    }

    /// Marks the item as diverged from the remote store.
    pub fn mark_dirty(&mut self) {
        self.synced = false;
        self.pending_sync = true;
    }

    /// Applies an edit command, bumping `updated_at` and flipping the item
    /// back to unsynced/pending.
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(name) = &patch.name {
            self.name = normalize_upper(name);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(group) = &patch.group {
            self.group = group.trim().to_owned();
        }
        if let Some(details) = &patch.details {
            let details = normalize_upper(details);
            self.details = (!details.is_empty()).then_some(details);
        }
        if let Some(location) = &patch.location {
            self.location = location.trim().to_owned();
        }
        self.updated_at = Utc::now();
        self.mark_dirty();
    }
}

/// Validated input for creating an item.
///
/// The draft is the only way to construct an [`Item`]; malformed input is
/// rejected here at the boundary instead of propagating empty fields into
/// the collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemDraft {
    /// Item name (required).
    pub name: String,
    /// Stock count (required, non-negative by type).
    pub quantity: u32,
    /// Grouping label (required).
    pub group: String,
    /// Optional free-form details.
    #[serde(default)]
    pub details: Option<String>,
    /// Physical location label (required).
    pub location: String,
}

impl ItemDraft {
    /// Creates a draft from the required fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        quantity: u32,
        group: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            group: group.into(),
            details: None,
            location: location.into(),
        }
    }

    /// Sets the optional details field.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Checks that all required fields are present and non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("name is required".to_owned());
        }
        if self.group.trim().is_empty() {
            problems.push("group is required".to_owned());
        }
        if self.location.trim().is_empty() {
            problems.push("location is required".to_owned());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(problems))
        }
    }

    /// Builds an item with the given ID.
    ///
    /// The new item is unsynced and pending, timestamps set to now. Name and
    /// details are trimmed and uppercased; group and location are trimmed.
    pub fn into_item(self, id: ItemId) -> Result<Item, ValidationError> {
        self.validate()?;
        let now = Utc::now();
        let details = self
            .details
            .map(|d| normalize_upper(&d))
            .filter(|d| !d.is_empty());
        Ok(Item {
            id,
            name: normalize_upper(&self.name),
            quantity: self.quantity,
            group: self.group.trim().to_owned(),
            details,
            location: self.location.trim().to_owned(),
            created_at: now,
            updated_at: now,
            synced: false,
            pending_sync: true,
        })
    }
}

/// An explicit edit command carrying the fields to change.
///
/// `None` fields are left untouched. Setting `details` to a blank string
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    /// New name, if changing.
    pub name: Option<String>,
    /// New quantity, if changing.
    pub quantity: Option<u32>,
    /// New group, if changing.
    pub group: Option<String>,
    /// New details, if changing (blank clears).
    pub details: Option<String>,
    /// New location, if changing.
    pub location: Option<String>,
}

impl ItemPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.group.is_none()
            && self.details.is_none()
            && self.location.is_none()
    }
}

fn normalize_upper(value: &str) -> String {
    value.trim().to_uppercase()
}
