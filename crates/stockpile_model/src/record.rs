//! Queue records and deletion tombstones.

use crate::id::ItemId;
use crate::item::Item;
use serde::{Deserialize, Serialize};

/// A deletion marker for a previously-synced item.
///
/// Tombstones carry no business fields; they exist only to be replayed
/// against the remote store so the remote copy is removed too. Items that
/// were never pushed are simply dropped locally and need no tombstone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone {
    /// ID of the deleted item.
    pub id: ItemId,
    /// Always true; doubles as the wire-format discriminator.
    #[serde(rename = "_delete")]
    pub delete: bool,
}

impl Tombstone {
    /// Creates a tombstone for the given item ID.
    #[must_use]
    pub fn for_item(id: ItemId) -> Self {
        Self { id, delete: true }
    }
}

/// An entry in the offline mutation queue: either a full item state to
/// upsert or a tombstone to replay as a deletion.
///
/// The wire format is untagged; the required `_delete` field on tombstones
/// disambiguates the two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueueRecord {
    /// A deletion to replay remotely.
    Tombstone(Tombstone),
    /// An item state to insert or merge remotely.
    Item(Item),
}

impl QueueRecord {
    /// Returns the ID this record targets.
    #[must_use]
    pub fn id(&self) -> &ItemId {
        match self {
            QueueRecord::Tombstone(t) => &t.id,
            QueueRecord::Item(i) => &i.id,
        }
    }

    /// Returns true if this record is a deletion.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        matches!(self, QueueRecord::Tombstone(_))
    }
}

impl From<Item> for QueueRecord {
    fn from(item: Item) -> Self {
        QueueRecord::Item(item)
    }
}

impl From<Tombstone> for QueueRecord {
    fn from(tombstone: Tombstone) -> Self {
        QueueRecord::Tombstone(tombstone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDraft;

    #[test]
    fn tombstone_wire_format() {
        let t = Tombstone::for_item(ItemId::from("item_9"));
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["id"], "item_9");
        assert_eq!(json["_delete"], true);
    }

    #[test]
    fn untagged_records_disambiguate() {
        let tombstone_json = r#"{"id":"item_1","_delete":true}"#;
        let record: QueueRecord = serde_json::from_str(tombstone_json).unwrap();
        assert!(record.is_tombstone());
        assert_eq!(record.id().as_str(), "item_1");

        let item = ItemDraft::new("NUT", 3, "FASTENERS", "BIN 2")
            .into_item(ItemId::from("local_2"))
            .unwrap();
        let item_json = serde_json::to_string(&item).unwrap();
        let record: QueueRecord = serde_json::from_str(&item_json).unwrap();
        assert!(!record.is_tombstone());
        assert_eq!(record.id().as_str(), "local_2");
    }

    #[test]
    fn mixed_queue_round_trips() {
        let item = ItemDraft::new("WASHER", 9, "FASTENERS", "BIN 1")
            .into_item(ItemId::local())
            .unwrap();
        let records = vec![
            QueueRecord::from(item),
            QueueRecord::from(Tombstone::for_item(ItemId::from("item_5"))),
        ];
        let json = serde_json::to_string(&records).unwrap();
        let back: Vec<QueueRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);
    }
}
