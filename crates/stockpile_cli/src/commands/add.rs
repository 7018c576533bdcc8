//! Add command implementation.

use crate::Service;
use stockpile_model::ItemDraft;

/// Runs the add command.
pub fn run(
    service: &Service,
    name: &str,
    quantity: u32,
    group: &str,
    location: &str,
    details: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut draft = ItemDraft::new(name, quantity, group, location);
    if let Some(details) = details {
        draft = draft.with_details(details);
    }

    let item = service.add(draft)?;
    super::try_sync(service);

    println!("✓ Added {} x{} ({})", item.name, item.quantity, item.id);
    println!("  Status: {}", service.status());
    Ok(())
}
