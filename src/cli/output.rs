//! Shared CLI output helpers.
//!
//! Status lines go to stderr so stdout stays clean for downloaded data.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: paths, keys, hints
//! - Bold: headers
//! - Dimmed: secondary info

use std::io::Write;

use console::{style, StyledObject};

use crate::core::report::Report;
use crate::core::service::env_key;
use crate::error::{CatalogError, Error, Result, ServiceError};

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

fn styled<D>(value: D) -> StyledObject<D> {
    let s = style(value);
    if colors_enabled() {
        s
    } else {
        s.force_styling(false)
    }
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ synced .env`
pub fn success(msg: &str) {
    eprintln!("{} {}", styled("✓").green(), msg);
}

/// Print an error message (red).
pub fn error(msg: &str) {
    eprintln!("{} {}", styled("✗").red(), msg);
}

/// Print a warning message (yellow).
pub fn warn(msg: &str) {
    eprintln!("{} {}", styled("⚠").yellow(), msg);
}

/// Print a hint message (cyan).
///
/// Example: `→ run: stash sync .env`
pub fn hint(msg: &str) {
    eprintln!("{} {}", styled("→").cyan(), styled(msg).cyan());
}

/// Print a bold section header.
pub fn header(title: &str) {
    println!("{}", styled(title).bold());
}

/// Print a list item with bullet.
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    eprintln!("{}", styled(msg).dim());
}

/// Format a path string in cyan.
pub fn path(p: &str) -> String {
    styled(p).cyan().to_string()
}

/// Format a remote key in cyan.
pub fn key(k: &str) -> String {
    styled(k).cyan().to_string()
}

/// Format secondary text inline.
pub fn faint(s: &str) -> String {
    styled(s).dim().to_string()
}

/// Write raw data to stdout.
///
/// # Errors
///
/// Returns error if stdout is closed.
pub fn data(bytes: &[u8]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(bytes).map_err(Error::Io)?;
    out.flush().map_err(Error::Io)
}

/// Print a report's warnings and per-file failures.
pub fn report<T>(report: &Report<T>) {
    for warning in &report.warnings {
        warn(warning);
    }
    for (subject, err) in &report.failures {
        error(&format!("{}: {}", path(subject), err));
        if let Some(suggestion) = suggestion(err) {
            hint(&suggestion);
        }
    }
}

/// A next step for errors the user can fix.
pub fn suggestion(err: &Error) -> Option<String> {
    match err {
        Error::Catalog(CatalogError::NotFound(_)) => Some("run: stash sync <file>".into()),
        Error::Catalog(CatalogError::NoMatch(_)) => Some("run: stash list".into()),
        Error::Service(ServiceError::MissingOption(option)) => {
            Some(format!("set {} or run in a terminal", env_key(option)))
        }
        Error::Service(ServiceError::ConflictAborted) => {
            Some("run: stash get -o file to pull remote changes".into())
        }
        _ => None,
    }
}
