//! Stash - keep local config and secret files in sync with remote stores.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── sync          # Upload and catalog files
//! │   ├── get           # Download files or transformed output
//! │   ├── inject        # Replace ${key} tokens with remote values
//! │   ├── purge         # Delete remote data
//! │   ├── clean         # Delete local copies
//! │   ├── list, tag     # Catalog inspection and tagging
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── catalog/      # stash.yml model, filters, sync state
//!     ├── service/      # Service trait and backends
//!     │   ├── blob      # Whole-file objects (s3)
//!     │   ├── tree      # One parameter per key (parameter-store)
//!     │   ├── secrets   # Grouped JSON secrets (secrets-manager)
//!     │   ├── memory    # Local store emulation
//!     │   └── aws       # AWS SDK transports (feature `aws`)
//!     ├── output/       # Output transforms
//!     ├── stash/        # Operations over the catalog
//!     └── token         # ${key::FIELD} references
//! ```
//!
//! # Features
//!
//! - One catalog per project, committed alongside the code
//! - Three storage shapes behind one [`core::service::Service`] trait
//! - Conflict detection against the last confirmed sync
//! - Output transforms for shells and container task definitions

pub mod cli;
pub mod core;
pub mod error;
