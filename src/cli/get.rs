//! Get command.

use zeroize::Zeroizing;

use crate::cli::{open, output, Target};
use crate::core::output::OutputKind;
use crate::core::stash::GetOptions;
use crate::error::Result;

/// Download files to stdout, or back to their paths with `-o file`.
pub fn execute(target: Target, kind: OutputKind) -> Result<()> {
    let mut stash = open(&target.catalog)?;

    let report = stash.get(GetOptions {
        selection: target.selection(),
        output: kind,
    })?;

    let mut pipe = Zeroizing::new(Vec::new());
    for item in &report.items {
        if item.output == OutputKind::File {
            output::success(&format!("restored {}", output::path(&item.path)));
            continue;
        }
        pipe.extend_from_slice(&item.data);
        if !pipe.ends_with(b"\n") {
            pipe.push(b'\n');
        }
    }
    output::data(&pipe)?;

    output::report(&report);
    report.into_result("get").map(|_| ())
}
