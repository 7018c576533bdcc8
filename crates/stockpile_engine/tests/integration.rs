//! End-to-end scenarios across the service, orchestrator, and remote store.

use std::sync::Arc;
use std::time::Duration;
use stockpile_engine::{
    FileLocalStore, InventoryService, MemoryLocalStore, SyncOrchestrator, SyncOutcome, SyncStatus,
};
use stockpile_model::{ItemDraft, ItemPatch};
use stockpile_remote::{MemoryHost, RemoteStore};

fn service() -> InventoryService<MemoryHost> {
    InventoryService::with_orchestrator(
        SyncOrchestrator::new(
            RemoteStore::new(MemoryHost::new()),
            Arc::new(MemoryLocalStore::new()),
        )
        .with_debounce(Duration::ZERO),
    )
}

fn draft(name: &str, quantity: u32) -> ItemDraft {
    ItemDraft::new(name, quantity, "FASTENERS", "SHELF A")
}

#[test]
fn offline_session_syncs_when_back_online() {
    let service = service();
    service.set_online(false);

    let bolt = service.add(draft("bolt", 5)).unwrap();
    service
        .edit(
            &bolt.id,
            &ItemPatch {
                quantity: Some(7),
                ..Default::default()
            },
        )
        .unwrap();
    service.add(draft("nut", 2)).unwrap();
    assert_eq!(service.sync().unwrap(), SyncOutcome::Offline);

    service.set_online(true);
    let outcome = service.poll_network_regained().unwrap();
    assert_eq!(outcome, Some(SyncOutcome::Completed { pushed: 3, pulled: 2 }));

    // Duplicate queue entries for bolt collapsed in order: the edit won.
    let remote = service.orchestrator().remote().read_all().unwrap().items;
    assert_eq!(remote.len(), 2);
    let bolt_remote = remote.iter().find(|i| i.id == bolt.id).unwrap();
    assert_eq!(bolt_remote.quantity, 7);
    assert!(bolt_remote.synced);

    assert_eq!(service.status(), SyncStatus::Synced);
    assert!(service.last_sync().is_some());
}

#[test]
fn two_devices_converge_remote_wins() {
    let host = Arc::new(MemoryHost::new());
    host.seed("[]");

    // Device A creates and pushes an item.
    let a = InventoryService::new(
        RemoteStore::new(Arc::clone(&host)),
        Arc::new(MemoryLocalStore::new()),
    );
    let bolt = a.add(draft("bolt", 5)).unwrap();
    a.sync().unwrap();

    // Device B pulls it, edits it, pushes.
    let b = InventoryService::new(
        RemoteStore::new(Arc::clone(&host)),
        Arc::new(MemoryLocalStore::new()),
    );
    b.sync().unwrap();
    assert_eq!(b.list().len(), 1);
    b.edit(
        &bolt.id,
        &ItemPatch {
            quantity: Some(99),
            ..Default::default()
        },
    )
    .unwrap();
    b.sync().unwrap();

    // Device A edits without syncing first; its push goes up, then the
    // next cycle's pull shows whatever the remote holds.
    a.edit(
        &bolt.id,
        &ItemPatch {
            quantity: Some(1),
            ..Default::default()
        },
    )
    .unwrap();
    a.sync().unwrap();
    b.sync().unwrap();

    // Last push wins per id on both devices.
    assert_eq!(a.list()[0].quantity, 1);
    assert_eq!(b.list()[0].quantity, 1);
}

#[test]
fn concurrent_syncs_submit_the_queue_once() {
    let service = Arc::new(service());
    service.add(draft("bolt", 5)).unwrap();

    std::thread::scope(|scope| {
        let barrier = Arc::new(std::sync::Barrier::new(4));
        for _ in 0..4 {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            scope.spawn(move || {
                barrier.wait();
                // AlreadyRunning and Completed are both fine; an error is not.
                service.sync().unwrap();
            });
        }
    });

    // However the threads interleaved, the batch was written exactly once.
    let host = service.orchestrator().remote().host();
    assert_eq!(host.store_calls(), 1);
    let remote = service.orchestrator().remote().read_all().unwrap().items;
    assert_eq!(remote.len(), 1);
    assert_eq!(service.stats().pending, 0);
}

#[test]
fn deletion_propagates_between_devices() {
    let host = Arc::new(MemoryHost::new());
    host.seed("[]");

    let a = InventoryService::new(
        RemoteStore::new(Arc::clone(&host)),
        Arc::new(MemoryLocalStore::new()),
    );
    let bolt = a.add(draft("bolt", 5)).unwrap();
    a.sync().unwrap();

    let b = InventoryService::new(
        RemoteStore::new(Arc::clone(&host)),
        Arc::new(MemoryLocalStore::new()),
    );
    b.sync().unwrap();
    assert_eq!(b.list().len(), 1);

    a.remove(&bolt.id).unwrap();
    a.sync().unwrap();

    // B still holds the synced copy until it pulls; then it drops.
    b.sync().unwrap();
    assert!(b.list().is_empty());
}

#[test]
fn state_survives_a_restart_through_the_file_store() {
    let dir = tempfile::tempdir().unwrap();

    {
        let service = InventoryService::with_orchestrator(SyncOrchestrator::new(
            RemoteStore::new(MemoryHost::new()),
            Arc::new(FileLocalStore::new(dir.path()).unwrap()),
        ));
        service.set_online(false);
        service.add(draft("bolt", 5)).unwrap();
        service.add(draft("nut", 2)).unwrap();
    }

    // Fresh process: state loads, queue replays against a fresh remote.
    let service = InventoryService::with_orchestrator(SyncOrchestrator::new(
        RemoteStore::new(MemoryHost::new()),
        Arc::new(FileLocalStore::new(dir.path()).unwrap()),
    ));
    service.start().unwrap();

    assert_eq!(service.list().len(), 2);
    assert!(service.list().iter().all(|i| i.synced));
    let remote = service.orchestrator().remote().read_all().unwrap().items;
    assert_eq!(remote.len(), 2);
}

#[test]
fn backup_moves_a_collection_between_hosts() {
    let source = service();
    source.add(draft("bolt", 5)).unwrap();
    source
        .add(draft("plank", 3).with_details("oak"))
        .unwrap();
    source.sync().unwrap();

    let envelope = source.export().unwrap();

    let target = service();
    let count = target.import(&envelope).unwrap();
    assert_eq!(count, 2);

    let names: Vec<_> = target.list().iter().map(|i| i.name.clone()).collect();
    assert_eq!(names, vec!["PLANK", "BOLT"]);
    assert_eq!(target.status(), SyncStatus::Synced);
}
