//! Command-line interface.

pub mod clean;
pub mod completions;
pub mod get;
pub mod inject;
pub mod list;
pub mod output;
pub mod purge;
pub mod sync;
pub mod tag;

use clap::{Args, Parser, Subcommand};

use crate::core::catalog::StateStore;
use crate::core::constants::CATALOG_FILE;
use crate::core::output::OutputKind;
use crate::core::service::{Io, Registry};
use crate::core::stash::{Selection, Stash};
use crate::error::Result;

const OUTPUTS_HELP: &str = "\
Outputs:
  original                 stdout  data as stored
  file                     file    original file path
  json                     stdout  JSON object
  terminal-export          stdout  export KEY=\"value\" lines
  terminal-export-literal  stdout  export KEY='value' lines
  ecs-task-env             stdout  task definition environment (name/value)
  ecs-task-inject-json     stdout  task definition secrets (name/valueFrom)
  ecs-task-inject-env      stdout  task definition env file (NAME=arn)";

/// Stash - keep local config files in sync with remote secret stores.
#[derive(Parser)]
#[command(
    name = "stash",
    about = "Keep local config and secret files in sync with remote secret stores",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which catalog and which of its files a command acts on.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Local file paths
    pub files: Vec<String>,

    /// Catalog file
    #[arg(short = 'f', long = "file", env = "STASH_FILE", default_value = CATALOG_FILE)]
    pub catalog: String,

    /// Service key (s3, parameter-store, secrets-manager)
    #[arg(short, long, env = "STASH_SERVICE", default_value = "")]
    pub service: String,

    /// Tags, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

impl Target {
    fn selection(&self) -> Selection {
        Selection {
            files: self.files.clone(),
            tags: self.tags.clone(),
            service: self.service.clone(),
        }
    }
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Upload local files to their services, cataloging new ones
    Sync {
        #[command(flatten)]
        target: Target,

        /// Context for a new catalog (skips setup prompts)
        #[arg(short, long, env = "STASH_CONTEXT")]
        context: Option<String>,

        /// Keep local files after syncing
        #[arg(long)]
        no_clean: bool,
    },

    /// Download files from their services
    #[command(alias = "download", after_help = OUTPUTS_HELP)]
    Get {
        #[command(flatten)]
        target: Target,

        /// Output format
        #[arg(short, long, default_value = "original", value_parser = OutputKind::parse)]
        output: OutputKind,
    },

    /// Replace ${key} and ${key::FIELD} tokens with remote values
    #[command(after_help = OUTPUTS_HELP)]
    Inject {
        /// Files containing tokens; reads stdin when none are given
        files: Vec<String>,

        /// Service holding the referenced keys
        #[arg(short, long, env = "STASH_SERVICE")]
        service: String,

        /// Output format
        #[arg(short, long, default_value = "original", value_parser = OutputKind::parse)]
        output: OutputKind,
    },

    /// Delete local copies of cataloged files
    Clean {
        #[command(flatten)]
        target: Target,
    },

    /// Delete remote data and stop tracking the files
    Purge {
        #[command(flatten)]
        target: Target,

        /// Ask for each remote key before deleting
        #[arg(short, long, env = "STASH_WARN")]
        warn: bool,
    },

    /// List cataloged files by service
    List {
        #[command(flatten)]
        target: Target,
    },

    /// Add, remove, or replace tags on cataloged files
    Tag {
        #[command(flatten)]
        target: Target,

        /// Tags to add, comma separated
        #[arg(short, long, value_delimiter = ',')]
        add: Vec<String>,

        /// Tags to remove, comma separated
        #[arg(short, long, value_delimiter = ',')]
        delete: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(command: Command) -> Result<()> {
    use Command::*;

    match command {
        Sync {
            target,
            context,
            no_clean,
        } => sync::execute(target, context, no_clean),
        Get { target, output } => get::execute(target, output),
        Inject {
            files,
            service,
            output,
        } => inject::execute(files, service, output),
        Clean { target } => clean::execute(target),
        Purge { target, warn } => purge::execute(target, warn),
        List { target } => list::execute(target),
        Tag {
            target,
            add,
            delete,
        } => tag::execute(target, add, delete),
        Completions { shell } => completions::execute(shell),
    }
}

/// Open an existing catalog with the standard services.
fn open(catalog: &str) -> Result<Stash> {
    Stash::open(catalog, Registry::standard()?, StateStore::open()?, Io::terminal())
}

/// Open a catalog, starting a new one when missing.
fn open_or_new(catalog: &str) -> Result<Stash> {
    Stash::open_or_new(catalog, Registry::standard()?, StateStore::open()?, Io::terminal())
}
