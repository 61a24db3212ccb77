//! Tag command.

use crate::cli::{open, output, Target};
use crate::core::stash::TagOptions;
use crate::error::Result;

/// Edit tags on cataloged files.
pub fn execute(target: Target, add: Vec<String>, delete: Vec<String>) -> Result<()> {
    let mut stash = open(&target.catalog)?;

    let report = stash.tag(TagOptions {
        selection: target.selection(),
        add,
        delete,
    })?;

    for item in &report.items {
        output::success(&format!(
            "tagged {} [{}]",
            output::path(&item.path),
            item.tags.join(", ")
        ));
    }
    if report.items.is_empty() {
        output::dimmed("no tags changed");
    }

    Ok(())
}
