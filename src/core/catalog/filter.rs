//! Filter algebra.
//!
//! Selects catalog entries by explicit path, tag subset, or service, and
//! partitions matches by service for batched processing.

use std::collections::BTreeMap;

use super::Entry;
use crate::core::types::{CatalogKey, ServiceKey};

/// Entry selection criteria. Every empty field is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub files: Vec<String>,
    pub tags: Vec<String>,
    pub service: String,
}

impl Filter {
    /// Filter for read operations (get, purge, list, ...): all criteria apply.
    pub fn read(files: Vec<String>, tags: Vec<String>, service: impl Into<String>) -> Self {
        Self {
            files,
            tags,
            service: service.into(),
        }
    }

    /// Filter for write operations (sync).
    ///
    /// Explicit files win; tags and service only restrict when no files are
    /// named, since they describe the new entries rather than select them.
    pub fn write(files: Vec<String>, tags: Vec<String>, service: impl Into<String>) -> Self {
        if files.is_empty() {
            Self::read(files, tags, service)
        } else {
            Self {
                files,
                ..Self::default()
            }
        }
    }

    /// Whether no criteria are set.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.tags.is_empty() && self.service.is_empty()
    }

    /// Whether an entry satisfies every set criterion.
    pub fn matches(&self, entry: &Entry) -> bool {
        if !self.files.is_empty() && !self.files.iter().any(|f| *f == entry.path) {
            return false;
        }

        if !self.tags.iter().all(|t| entry.tags.contains(t)) {
            return false;
        }

        self.service.is_empty() || self.service == entry.service
    }

    /// Human readable form, e.g. `file(s)[.env] or service[s3]`.
    pub fn describe(&self, delimiter: &str) -> String {
        let mut parts = Vec::new();

        if !self.files.is_empty() {
            parts.push(format!("file(s)[{}]", self.files.join(" ")));
        }
        if !self.tags.is_empty() {
            parts.push(format!("tag(s)[{}]", self.tags.join(" ")));
        }
        if !self.service.is_empty() {
            parts.push(format!("service[{}]", self.service));
        }

        parts.join(delimiter)
    }
}

/// Matched entries keyed by catalog key.
pub type Matches = BTreeMap<CatalogKey, Entry>;

/// Partition matches by service, keeping catalog keys.
pub fn group_by_service(matches: Matches) -> BTreeMap<ServiceKey, Matches> {
    let mut grouped: BTreeMap<ServiceKey, Matches> = BTreeMap::new();

    for (key, entry) in matches {
        grouped
            .entry(entry.service.clone())
            .or_default()
            .insert(key, entry);
    }

    grouped
}
