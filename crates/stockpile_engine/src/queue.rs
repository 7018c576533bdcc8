//! Offline mutation queue.

use std::collections::VecDeque;
use stockpile_model::{ItemId, QueueRecord};

/// Ordered queue of mutations awaiting a push to the remote store.
///
/// The queue never deduplicates: a later record for the same id simply
/// supersedes the earlier one when the batch is replayed in order. Records
/// are read out with [`records`](Self::records) and cleared separately,
/// only once the remote has confirmed the batch.
#[derive(Debug, Default)]
pub struct OfflineQueue {
    records: VecDeque<QueueRecord>,
}

impl OfflineQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a queue from persisted records, preserving order.
    #[must_use]
    pub fn from_records(records: Vec<QueueRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Appends a record.
    pub fn enqueue(&mut self, record: QueueRecord) {
        self.records.push_back(record);
    }

    /// Returns all queued records in order, without clearing.
    #[must_use]
    pub fn records(&self) -> Vec<QueueRecord> {
        self.records.iter().cloned().collect()
    }

    /// Drops the first `count` records after the remote confirmed them.
    ///
    /// Records enqueued while the batch was in flight keep their place.
    pub fn confirm(&mut self, count: usize) {
        self.records.drain(..count.min(self.records.len()));
    }

    /// Drops every queued record for the given id. Returns how many were
    /// removed.
    pub fn purge(&mut self, id: &ItemId) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        before - self.records.len()
    }

    /// Drops all queued records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of queued records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_model::{ItemId, Tombstone};

    #[test]
    fn records_do_not_clear_the_queue() {
        let mut queue = OfflineQueue::new();
        queue.enqueue(Tombstone::for_item(ItemId::from("item_1")).into());
        queue.enqueue(Tombstone::for_item(ItemId::from("item_2")).into());

        let records = queue.records();
        assert_eq!(records.len(), 2);
        assert_eq!(queue.len(), 2);

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn duplicate_ids_are_kept_in_order() {
        let mut queue = OfflineQueue::new();
        queue.enqueue(Tombstone::for_item(ItemId::from("item_1")).into());
        queue.enqueue(Tombstone::for_item(ItemId::from("item_1")).into());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn confirm_drops_only_the_pushed_prefix() {
        let mut queue = OfflineQueue::new();
        queue.enqueue(Tombstone::for_item(ItemId::from("item_1")).into());
        queue.enqueue(Tombstone::for_item(ItemId::from("item_2")).into());
        // A third record arrives while the first two are in flight.
        queue.enqueue(Tombstone::for_item(ItemId::from("item_3")).into());

        queue.confirm(2);
        let records = queue.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id().as_str(), "item_3");

        // Confirming more than queued is harmless.
        queue.confirm(10);
        assert!(queue.is_empty());
    }

    #[test]
    fn purge_removes_every_record_for_an_id() {
        let mut queue = OfflineQueue::new();
        queue.enqueue(Tombstone::for_item(ItemId::from("item_1")).into());
        queue.enqueue(Tombstone::for_item(ItemId::from("item_2")).into());
        queue.enqueue(Tombstone::for_item(ItemId::from("item_1")).into());

        assert_eq!(queue.purge(&ItemId::from("item_1")), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.records()[0].id().as_str(), "item_2");
    }

    #[test]
    fn round_trips_through_persisted_records() {
        let mut queue = OfflineQueue::new();
        queue.enqueue(Tombstone::for_item(ItemId::from("item_1")).into());

        let restored = OfflineQueue::from_records(queue.records());
        assert_eq!(restored.records(), queue.records());
    }
}
