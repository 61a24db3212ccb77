//! Clean command.

use crate::cli::{open, output, Target};
use crate::error::Result;

/// Delete local copies of cataloged files.
pub fn execute(target: Target) -> Result<()> {
    let stash = open(&target.catalog)?;
    let report = stash.clean(&target.selection())?;

    for path in &report.items {
        output::dimmed(&format!("  removed {}", path));
    }
    output::success(&format!("{} file(s) cleaned", report.items.len()));

    output::report(&report);
    report.into_result("clean").map(|_| ())
}
