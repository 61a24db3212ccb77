//! Purge command.

use crate::cli::{open, output, Target};
use crate::core::stash::PurgeOptions;
use crate::error::{Error, Result};

/// Delete remote data for cataloged files.
///
/// Removes the catalog itself once it tracks nothing.
pub fn execute(target: Target, warn: bool) -> Result<()> {
    let mut stash = open(&target.catalog)?;

    let report = stash.purge(PurgeOptions {
        selection: target.selection(),
        warn,
    })?;

    for item in &report.items {
        output::success(&format!(
            "purged {} {} {}",
            output::path(&item.path),
            output::faint("→"),
            output::key(&format!("{}:{}", item.service, item.remote_key)),
        ));
    }
    output::report(&report);

    if stash.catalog().files.is_empty() && stash.catalog_path().exists() {
        std::fs::remove_file(stash.catalog_path())
            .map_err(|e| Error::file(stash.catalog_path(), e))?;
        output::dimmed(&format!("removed empty catalog {}", target.catalog));
        output::hint("remember to clean up any configuration infrastructure");
    }

    report.into_result("purge").map(|_| ())
}
