//! Export and import command implementations.

use crate::Service;
use std::fs;
use std::path::Path;

/// Runs the export command.
pub fn export(service: &Service, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let envelope = service.export()?;
    match output {
        Some(path) => {
            fs::write(path, &envelope)?;
            println!("✓ Exported to {}", path.display());
        }
        None => println!("{envelope}"),
    }
    Ok(())
}

/// Runs the import command.
pub fn import(service: &Service, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(input)?;
    let count = service.import(&raw)?;
    println!("✓ Restored {count} item(s) from {}", input.display());
    Ok(())
}
