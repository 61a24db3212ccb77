//! Remote services.
//!
//! A service mirrors one local file into a remote store and back. Three
//! storage shapes are supported:
//!
//! - **s3**: the whole file as one object ([`Blob`]).
//! - **parameter-store**: one encrypted parameter per env key ([`Tree`]).
//! - **secrets-manager**: one secret per file or per key group ([`Secrets`]).
//!
//! Services talk to their store through a client trait ([`BlobClient`],
//! [`TreeClient`], [`SecretClient`]). The default clients emulate the stores
//! on disk; the AWS clients are feature-gated (`aws`).
//!
//! ## Adding a New Service
//!
//! 1. Implement the `Service` trait
//! 2. Register it in [`Registry::standard`]
//! 3. Feature-gate the transport if it needs a cloud SDK

use crate::core::output::OutputKind;
use crate::core::types::SecurityRating;
use crate::error::Result;

mod blob;
mod changes;
mod client;
mod memory;
mod prompt;
mod registry;
mod secrets;
mod tree;
mod unit;
pub mod value;

#[cfg(feature = "aws")]
pub mod aws;

pub use blob::Blob;
pub use changes::{confirm_overwrite, Changes, RemoteSecret, SecretSet};
pub use client::{
    BlobClient, Object, Parameter, ParameterVersion, Secret, SecretClient, SecretLookup,
    TreeClient,
};
pub use memory::{MemoryBlobs, MemorySecrets, MemoryTree};
pub use prompt::{Answer, Io, Prompt, Scripted, Terminal, Unattended};
pub use registry::Registry;
pub use secrets::Secrets;
pub use tree::Tree;
pub use unit::{env_key, remote_key, OptionSpec, Unit};

/// A remote store that can hold tracked files.
///
/// Every call gets a fresh [`Unit`] and hands back the unit with its keys and
/// options updated; the engine copies those into the catalog.
pub trait Service {
    /// Stable identifier used in the catalog (`s3`, `parameter-store`, ...).
    fn key(&self) -> &'static str;

    /// Human readable name for prompts and listings.
    fn name(&self) -> String {
        self.key()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Map a logical `{context}/{path}` key to the store's naming rules.
    fn object_key(&self, key: &str) -> String;

    /// Whether every given file type can be stored.
    fn compatible(&self, file_types: &[&str]) -> bool;

    fn security_rating(&self) -> SecurityRating;

    /// Bind the prompt handle and prepare the client.
    ///
    /// # Errors
    ///
    /// Returns error if the transport cannot be initialized.
    fn initialize(&mut self, io: Io) -> Result<()>;

    /// Push the unit's data; empty data purges.
    ///
    /// # Errors
    ///
    /// Returns error on conflict abort, invalid data, or store failure.
    fn sync(&mut self, unit: Unit) -> Result<Unit>;

    /// Fetch remote data into the unit, shaped for `output`.
    ///
    /// # Errors
    ///
    /// Returns error if tracked keys are missing or the store fails.
    fn download(&mut self, unit: Unit, output: OutputKind) -> Result<Unit>;

    /// Delete every tracked remote key.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    fn purge(&mut self, unit: Unit) -> Result<Unit>;
}

/// `None` when `value` is the store's default key, so the store applies it.
pub(crate) fn non_default<'a>(value: &'a str, default: &str) -> Option<&'a str> {
    if value.is_empty() || value == default {
        None
    } else {
        Some(value)
    }
}
