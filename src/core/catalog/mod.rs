//! Catalog model.
//!
//! The catalog (`stash.yml`) tracks which local files map to which service
//! and remote keys. It is the project's configuration and is meant to be
//! committed.

mod entry;
mod filter;
mod state;

pub use entry::Entry;
pub use filter::{group_by_service, Filter, Matches};
pub use state::{state_key, State, StateStore};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::CATALOG_BANNER;
use crate::core::path;
use crate::core::types::CatalogKey;
use crate::error::{CatalogError, Error, Result};

/// The manifest of tracked files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub version: String,

    /// Prefix applied to every derived remote key.
    #[serde(default)]
    pub context: String,

    /// Delete local copies after a successful sync.
    #[serde(default)]
    pub clean: bool,

    #[serde(default)]
    pub files: BTreeMap<CatalogKey, Entry>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(context: impl Into<String>, clean: bool) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            context: context.into(),
            clean,
            files: BTreeMap::new(),
        }
    }

    /// Load a catalog from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the file does not exist and
    /// [`CatalogError::Parse`] if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(path.to_path_buf()).into())
            }
            Err(e) => return Err(Error::file(path, e)),
        };

        if contents.lines().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        }) {
            return Ok(Self::default());
        }

        let catalog: Self = serde_yaml::from_str(&contents).map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), files = catalog.files.len(), "loaded catalog");
        Ok(catalog)
    }

    /// Whether a catalog file exists.
    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// Write the catalog with its banner.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml =
            serde_yaml::to_string(self).map_err(|e| CatalogError::Serialize(e.to_string()))?;

        let mut contents = String::with_capacity(CATALOG_BANNER.len() + yaml.len());
        contents.push_str(CATALOG_BANNER);
        contents.push_str(&yaml);

        std::fs::write(path, contents).map_err(|e| Error::file(path, e))?;
        debug!(path = %path.display(), files = self.files.len(), "saved catalog");
        Ok(())
    }

    /// Find the entry tracking a local path.
    pub fn get_file(&self, path: &str) -> Option<(&CatalogKey, &Entry)> {
        self.files.iter().find(|(_, e)| e.path == path)
    }

    /// Track a new file.
    ///
    /// The key defaults to [`path::initial_key`], tags default to the path's
    /// directories, and the type is inferred from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateKey`] if the key is already used.
    pub fn add_file(
        &mut self,
        key: Option<&str>,
        file_path: &str,
        service: &str,
        tags: &[String],
    ) -> Result<CatalogKey> {
        let key = match key {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => path::initial_key(file_path),
        };

        if self.files.contains_key(&key) {
            return Err(CatalogError::DuplicateKey(key).into());
        }

        let tags = if tags.is_empty() {
            path::tags(file_path)
        } else {
            tags.to_vec()
        };

        let entry = Entry {
            path: file_path.to_string(),
            file_type: path::file_type(file_path),
            service: service.to_string(),
            tags,
            ..Entry::default()
        };

        debug!(key = %key, path = file_path, service, "cataloged file");
        self.files.insert(key.clone(), entry);
        Ok(key)
    }

    /// Entries satisfying a filter.
    pub fn filter(&self, filter: &Filter) -> Matches {
        self.files
            .iter()
            .filter(|(_, e)| filter.matches(e))
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect()
    }

    /// Entries satisfying a filter, failing when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoMatch`] if the selection is empty.
    pub fn select(&self, filter: &Filter) -> Result<Matches> {
        let matches = self.filter(filter);
        if matches.is_empty() {
            let described = if filter.is_empty() {
                "in catalog".to_string()
            } else {
                filter.describe(" or ")
            };
            return Err(CatalogError::NoMatch(described).into());
        }
        Ok(matches)
    }

    /// Copy a service result (keys and options) back into its entry.
    pub fn merge(&mut self, key: &str, keys: &[String], options: &BTreeMap<String, String>) {
        if let Some(entry) = self.files.get_mut(key) {
            entry.keys = keys.to_vec();
            entry.options = options.clone();
        }
    }

    /// Stop tracking an entry.
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.files.remove(key)
    }

    /// Service already used for files of the same type, if any.
    pub fn lookup_service(&self, file_path: &str) -> Option<&str> {
        let file_type = path::file_type(file_path);
        self.files
            .values()
            .find(|e| e.file_type == file_type && !e.service.is_empty())
            .map(|e| e.service.as_str())
    }

    /// Expand `$VAR` and `${VAR}` references in every string field.
    pub fn expand_env(&mut self) {
        self.context = expand(&self.context);
        for entry in self.files.values_mut() {
            entry.path = expand(&entry.path);
            entry.service = expand(&entry.service);
            for value in entry.options.values_mut() {
                *value = expand(value);
            }
            for key in entry.keys.iter_mut() {
                *key = expand(key);
            }
            for tag in entry.tags.iter_mut() {
                *tag = expand(tag);
            }
        }
    }
}

/// Replace environment references; unset variables expand to nothing.
fn expand(value: &str) -> String {
    if !value.contains('$') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(i) = rest.find('$') {
        out.push_str(&rest[..i]);
        let after = &rest[i + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                out.push_str(&std::env::var(&braced[..end]).unwrap_or_default());
                rest = &braced[end + 1..];
                continue;
            }
        }

        let name_len = after
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(after.len());

        if name_len == 0 {
            out.push('$');
        } else {
            out.push_str(&std::env::var(&after[..name_len]).unwrap_or_default());
        }
        rest = &after[name_len..];
    }

    out.push_str(rest);
    out
}
