//! List command.

use crate::cli::{open, output, Target};
use crate::error::Result;

/// Print cataloged files grouped by service.
pub fn execute(target: Target) -> Result<()> {
    let stash = open(&target.catalog)?;
    let listed = stash.list(&target.selection())?;

    for (service, entries) in &listed {
        let name = stash
            .registry()
            .get(service)
            .map(|s| s.name())
            .unwrap_or_else(|| service.clone());
        output::header(&name);

        for (_, entry) in entries {
            let tags = if entry.tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", entry.tags.join(", "))
            };
            output::list_item(&format!("{}{}", output::path(&entry.path), output::faint(&tags)));
            for key in &entry.keys {
                println!("      {}", output::faint(key));
            }
        }
        println!();
    }

    Ok(())
}
