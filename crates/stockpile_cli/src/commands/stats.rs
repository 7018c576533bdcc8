//! Stats command implementation.

use crate::Service;

/// Runs the stats command.
pub fn run(service: &Service) -> Result<(), Box<dyn std::error::Error>> {
    let stats = service.stats();

    println!("Items:     {}", stats.total_items);
    println!("Quantity:  {}", stats.total_quantity);
    println!("Pending:   {}", stats.pending);

    if !stats.by_group.is_empty() {
        println!("By group:");
        for (group, count) in &stats.by_group {
            println!("  {group:20} {count}");
        }
    }
    if !stats.by_location.is_empty() {
        println!("By location:");
        for (location, count) in &stats.by_location {
            println!("  {location:20} {count}");
        }
    }
    Ok(())
}
