//! Search command implementation.

use crate::Service;

/// Runs the search command.
pub fn run(service: &Service, term: &str) -> Result<(), Box<dyn std::error::Error>> {
    let hits = service.search(term);
    if hits.is_empty() {
        println!("No matches for \"{term}\".");
        return Ok(());
    }

    for item in &hits {
        super::list::print_item(item);
    }
    println!("{} match(es)", hits.len());
    Ok(())
}
