//! Remove command implementation.

use crate::Service;
use stockpile_model::ItemId;

/// Runs the remove command.
pub fn run(service: &Service, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    service.remove(&ItemId::from(id))?;
    super::try_sync(service);

    println!("✓ Removed {id}");
    Ok(())
}
