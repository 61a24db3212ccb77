//! Exchange unit.
//!
//! A [`Unit`] is built fresh for every sync, download, or purge call and
//! carries the local payload plus everything a service needs to address the
//! remote side. Only its keys and options flow back into the catalog.

use std::collections::BTreeMap;
use std::fmt;

use zeroize::Zeroizing;

use super::{Io, Service};
use crate::core::catalog::Entry;
use crate::core::constants::ENV_PREFIX;
use crate::core::path;
use crate::core::service::value;
use crate::core::types::Synced;
use crate::error::Result;

/// A backend option and how to ask for it.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec<'a> {
    pub key: &'a str,
    pub default: Option<&'a str>,
    pub help: Option<&'a str>,
    /// Allowed values; empty means free text.
    pub items: &'a [&'a str],
}

impl<'a> OptionSpec<'a> {
    pub fn text(key: &'a str) -> Self {
        Self {
            key,
            default: None,
            help: None,
            items: &[],
        }
    }

    pub fn with_default(mut self, default: &'a str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_help(mut self, help: &'a str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_items(mut self, items: &'a [&'a str]) -> Self {
        self.items = items;
        self
    }
}

/// The backend-neutral unit of work.
#[derive(Clone, Default)]
pub struct Unit {
    pub context: String,
    pub catalog_key: String,
    /// Default remote location derived from (context, path, service).
    pub remote_key: String,
    pub local_path: String,
    pub file_type: String,
    pub options: BTreeMap<String, String>,
    pub keys: Vec<String>,
    pub data: Zeroizing<Vec<u8>>,
    /// Last confirmed sync; `None` when never synced.
    pub synced: Option<Synced>,
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("context", &self.context)
            .field("catalog_key", &self.catalog_key)
            .field("remote_key", &self.remote_key)
            .field("local_path", &self.local_path)
            .field("file_type", &self.file_type)
            .field("options", &self.options)
            .field("keys", &self.keys)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("synced", &self.synced)
            .finish()
    }
}

impl Unit {
    /// Build the unit for a catalog entry.
    pub fn for_entry(
        context: &str,
        catalog_key: &str,
        entry: &Entry,
        service: &dyn Service,
        data: Vec<u8>,
        synced: Option<Synced>,
    ) -> Self {
        Self {
            context: context.to_string(),
            catalog_key: catalog_key.to_string(),
            remote_key: remote_key(context, &entry.path, service),
            local_path: entry.path.clone(),
            file_type: entry.file_type.clone(),
            options: entry.options.clone(),
            keys: entry.keys.clone(),
            data: Zeroizing::new(data),
            synced,
        }
    }

    /// Build a unit addressing one remote key directly, outside the catalog.
    pub fn for_reference(remote_key: &str, file_type: &str) -> Self {
        Self {
            remote_key: remote_key.to_string(),
            file_type: file_type.to_string(),
            keys: vec![remote_key.to_string()],
            ..Self::default()
        }
    }

    /// Payload as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns error if the payload is not valid UTF-8.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.data).map_err(|e| {
            crate::error::ServiceError::InvalidFile(format!("{}: {}", self.local_path, e)).into()
        })
    }

    /// Replace the payload.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = Zeroizing::new(data);
    }

    /// Resolve an option: stored value, then `STASH_<KEY>`, then a prompt.
    ///
    /// The result is persisted in the unit's options.
    ///
    /// # Errors
    ///
    /// Returns error if the prompt fails or cannot be answered.
    pub fn ensure_option(&mut self, spec: OptionSpec<'_>, io: &Io) -> Result<String> {
        if let Some(value) = self.options.get(spec.key) {
            return Ok(value.clone());
        }

        let value = match std::env::var(env_key(spec.key)) {
            Ok(v) if !spec.items.is_empty() => v.to_lowercase(),
            Ok(v) => v,
            Err(_) => self.ask(spec, io)?,
        };

        self.options.insert(spec.key.to_string(), value.clone());
        Ok(value)
    }

    fn ask(&self, spec: OptionSpec<'_>, io: &Io) -> Result<String> {
        if spec.items.is_empty() {
            return io.input(spec.key, spec.default, spec.help);
        }

        let items: Vec<String> = spec.items.iter().map(|s| s.to_string()).collect();
        let default = spec
            .default
            .and_then(|d| spec.items.iter().position(|i| *i == d))
            .unwrap_or(0);
        let chosen = io.select(spec.key, &items, default)?;
        Ok(items[chosen].clone())
    }

    /// Option value, or a default when unset.
    pub fn option_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Tracked remote key whose last segment is `name`.
    pub fn lookup_remote_key(&self, name: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|k| path::base(k) == name)
            .map(String::as_str)
    }

    /// Whether the payload can be split into keys.
    pub fn supports_parsing(&self) -> bool {
        value::supports_parsing(&self.file_type, &self.data)
    }
}

/// Remote key for a path: `{context}/{path}` passed through the service.
pub fn remote_key(context: &str, local_path: &str, service: &dyn Service) -> String {
    service.object_key(&format!("{}/{}", context, path::trim_leading(local_path)))
}

/// Environment variable overriding an option.
pub fn env_key(option: &str) -> String {
    format!("{}{}", ENV_PREFIX, option.to_uppercase())
}
