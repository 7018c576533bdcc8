//! Sync command implementation.

use crate::Service;
use stockpile_engine::SyncOutcome;

/// Runs the sync command.
pub fn run(service: &Service) -> Result<(), Box<dyn std::error::Error>> {
    match service.sync()? {
        SyncOutcome::Completed { pushed, pulled } => {
            println!("✓ Synced: pushed {pushed}, pulled {pulled}");
        }
        SyncOutcome::Offline => println!("Offline; {} queued", service.stats().pending),
        SyncOutcome::AlreadyRunning => println!("Sync already in progress"),
    }
    Ok(())
}
