//! Per-user directory resolution.

use std::path::PathBuf;

use crate::core::constants::{HOME_DIR, HOME_ENV};
use crate::error::{Error, Result};

/// The per-user stash directory (`~/.stash`, or `$STASH_HOME`).
///
/// # Errors
///
/// Returns error if no home directory can be determined.
pub fn dir() -> Result<PathBuf> {
    if let Some(custom) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(custom));
    }

    dirs::home_dir()
        .map(|home| home.join(HOME_DIR))
        .ok_or_else(|| Error::Other("could not determine home directory".into()))
}

/// A path inside the per-user directory.
///
/// # Errors
///
/// Returns error if no home directory can be determined.
pub fn path(name: &str) -> Result<PathBuf> {
    Ok(dir()?.join(name))
}
