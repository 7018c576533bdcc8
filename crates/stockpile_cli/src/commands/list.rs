//! List command implementation.

use crate::Service;
use stockpile_model::Item;

/// Runs the list command.
pub fn run(service: &Service) -> Result<(), Box<dyn std::error::Error>> {
    let items = service.list();
    if items.is_empty() {
        println!("No items.");
        return Ok(());
    }

    for item in &items {
        print_item(item);
    }
    println!("{} item(s), status: {}", items.len(), service.status());
    Ok(())
}

pub(crate) fn print_item(item: &Item) {
    let flag = if item.pending_sync { "*" } else { " " };
    print!(
        "{flag} {:28} x{:<5} {:14} {:14}",
        item.name, item.quantity, item.group, item.location
    );
    if let Some(details) = &item.details {
        print!("  {details}");
    }
    println!("  [{}]", item.id);
}
