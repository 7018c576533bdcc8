//! Delete-all command implementation.

use crate::Service;

/// Runs the delete-all command.
pub fn run(service: &Service, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !yes {
        return Err("refusing to wipe the collection without --yes".into());
    }

    let count = service.list().len();
    service.delete_all()?;
    println!("✓ Deleted {count} item(s)");
    Ok(())
}
