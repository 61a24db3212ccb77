//! Sync command.

use crate::cli::{open_or_new, output, Target};
use crate::core::stash::SyncOptions;
use crate::error::Result;

/// Upload files, cataloging new ones.
pub fn execute(target: Target, context: Option<String>, no_clean: bool) -> Result<()> {
    let mut stash = open_or_new(&target.catalog)?;

    let report = stash.sync(SyncOptions {
        files: target.files,
        tags: target.tags,
        service: target.service,
        context,
        no_clean,
    })?;

    for item in &report.items {
        output::success(&format!(
            "synced {} {} {}",
            output::path(&item.path),
            output::faint("→"),
            output::key(&format!("{}:{}", item.service, item.remote_key)),
        ));
        if item.cleaned {
            output::dimmed(&format!("  removed local copy of {}", item.path));
        }
    }
    if report.total() == 0 {
        output::dimmed("nothing selected");
    }

    output::report(&report);
    report.into_result("sync").map(|_| ())
}
