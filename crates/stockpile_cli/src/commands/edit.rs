//! Edit command implementation.

use crate::Service;
use stockpile_model::{ItemId, ItemPatch};

/// Runs the edit command.
pub fn run(
    service: &Service,
    id: &str,
    name: Option<String>,
    quantity: Option<u32>,
    group: Option<String>,
    location: Option<String>,
    details: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let patch = ItemPatch {
        name,
        quantity,
        group,
        details,
        location,
    };
    if patch.is_empty() {
        return Err("nothing to change; pass at least one field flag".into());
    }

    let item = service.edit(&ItemId::from(id), &patch)?;
    super::try_sync(service);

    println!("✓ Updated {} x{} ({})", item.name, item.quantity, item.id);
    Ok(())
}
