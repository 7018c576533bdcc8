//! Remote-wins reconciliation.

use std::collections::HashSet;
use stockpile_model::Item;
use tracing::debug;

/// Merges a remote snapshot over the local collection.
///
/// The remote side is authoritative: for every id present remotely the
/// remote field values win, even over a newer local edit that was already
/// pushed. Local items survive only when they are absent remotely AND
/// still unsynced (not-yet-pushed creations). A synced local item missing
/// from the snapshot was deleted elsewhere and is dropped.
///
/// Deliberately no timestamp comparison; last writer to the remote file
/// wins per id.
#[must_use]
pub fn merge(remote: &[Item], local: &[Item]) -> Vec<Item> {
    let mut merged: Vec<Item> = Vec::with_capacity(remote.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(remote.len());

    // First occurrence per id wins within the remote set.
    for item in remote {
        if seen.insert(item.id.as_str()) {
            merged.push(item.clone());
        }
    }

    let mut kept_local = 0usize;
    for item in local {
        if !seen.contains(item.id.as_str()) && !item.synced {
            merged.push(item.clone());
            kept_local += 1;
        }
    }

    debug!(
        remote = remote.len(),
        local = local.len(),
        kept_local,
        merged = merged.len(),
        "merged remote snapshot"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_model::{ItemDraft, ItemId};

    fn item(id: &str, name: &str, quantity: u32) -> Item {
        ItemDraft::new(name, quantity, "G", "L")
            .into_item(ItemId::from(id))
            .unwrap()
    }

    fn synced_item(id: &str, name: &str, quantity: u32) -> Item {
        let mut item = item(id, name, quantity);
        item.mark_synced();
        item
    }

    #[test]
    fn empty_remote_keeps_all_unsynced_local() {
        let local = vec![item("local_1", "BOLT", 5), item("local_2", "NUT", 2)];
        let merged = merge(&[], &local);
        assert_eq!(merged, local);
        assert!(merged.iter().all(|i| !i.synced));
    }

    #[test]
    fn remote_wins_on_id_collision() {
        let remote = vec![synced_item("item_1", "BOLT", 9)];
        let local = vec![item("item_1", "BOLT", 3)];

        let merged = merge(&remote, &local);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].quantity, 9);
        assert!(merged[0].synced);
    }

    #[test]
    fn synced_local_missing_remotely_is_dropped() {
        let remote = vec![synced_item("item_1", "BOLT", 5)];
        let local = vec![
            synced_item("item_1", "BOLT", 5),
            synced_item("item_2", "NUT", 2), // deleted elsewhere
            item("local_3", "WASHER", 7),    // unsynced creation survives
        ];

        let merged = merge(&remote, &local);
        let ids: Vec<_> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["item_1", "local_3"]);
    }

    #[test]
    fn duplicate_remote_ids_collapse_to_first() {
        let remote = vec![
            synced_item("item_1", "BOLT", 5),
            synced_item("item_1", "BOLT", 99),
        ];
        let merged = merge(&remote, &[]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].quantity, 5);
    }

    #[test]
    fn remote_order_comes_first() {
        let remote = vec![synced_item("item_1", "BOLT", 5), synced_item("item_2", "NUT", 2)];
        let local = vec![item("local_3", "WASHER", 1)];
        let merged = merge(&remote, &local);
        let ids: Vec<_> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["item_1", "item_2", "local_3"]);
    }
}
