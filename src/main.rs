//! Stash - keep local config and secret files in sync with remote stores.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stash::cli::output;
use stash::cli::{execute, Cli};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("STASH_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("stash=debug")
        } else {
            EnvFilter::new("stash=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli.command) {
        output::error(&e.to_string());
        if let Some(hint) = output::suggestion(&e) {
            output::hint(&hint);
        }
        std::process::exit(1);
    }
}
