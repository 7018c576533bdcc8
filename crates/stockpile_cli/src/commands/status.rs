//! Status command implementation.

use crate::Service;

/// Runs the status command.
pub fn run(service: &Service) -> Result<(), Box<dyn std::error::Error>> {
    println!("Status:    {}", service.status());
    println!("Items:     {}", service.list().len());
    println!("Pending:   {}", service.stats().pending);
    match service.last_sync() {
        Some(at) => println!("Last sync: {}", at.to_rfc3339()),
        None => println!("Last sync: never"),
    }

    let stats = service.sync_stats();
    if stats.cycles_completed > 0 || stats.failures > 0 {
        println!(
            "Cycles:    {} ({} failed)",
            stats.cycles_completed + stats.failures,
            stats.failures
        );
    }
    if let Some(error) = &stats.last_error {
        println!("Last error: {error}");
    }
    Ok(())
}
