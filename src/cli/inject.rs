//! Inject command.

use std::io::{IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::core::catalog::StateStore;
use crate::core::output::OutputKind;
use crate::core::service::{Io, Registry};
use crate::core::stash::{InjectOptions, Stash, STDIN};
use crate::error::{Error, Result};

/// Resolve tokens in files, or in stdin when no files are given.
///
/// `-o file` rewrites each file in place; everything else goes to stdout.
pub fn execute(files: Vec<String>, service: String, kind: OutputKind) -> Result<()> {
    let stdin = if files.is_empty() { read_stdin()? } else { None };

    let mut stash = Stash::detached(Registry::standard()?, StateStore::open()?, Io::terminal());

    let report = stash.inject(InjectOptions {
        stdin,
        files,
        service,
        output: kind,
    })?;

    let mut pipe = Zeroizing::new(Vec::new());
    for item in &report.items {
        if kind == OutputKind::File && item.source != STDIN {
            std::fs::write(&item.source, &item.data).map_err(|e| Error::file(&item.source, e))?;
            output::success(&format!("injected {}", output::path(&item.source)));
            continue;
        }
        pipe.extend_from_slice(&item.data);
        if !pipe.ends_with(b"\n") {
            pipe.push(b'\n');
        }
    }
    output::data(&pipe)?;

    output::report(&report);
    report.into_result("inject").map(|_| ())
}

fn read_stdin() -> Result<Option<String>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut text = String::new();
    stdin.read_to_string(&mut text).map_err(Error::Io)?;
    Ok(Some(text).filter(|t| !t.is_empty()))
}
