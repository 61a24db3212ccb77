//! Catalog entry.
//!
//! A tracked local file and its remote assignment. Every field is safe to
//! commit; values never land in the catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Filter;

/// One tracked file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Local location.
    #[serde(default)]
    pub path: String,

    /// Local file type (env, json, ...).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub file_type: String,

    /// Owning service; empty until first sync.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service: String,

    /// Service preferences persisted across syncs.
    #[serde(rename = "opt", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,

    /// Remote keys this entry currently maps to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Delete the local copy after a successful sync.
    #[serde(default, skip_serializing_if = "is_false")]
    pub clean: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Entry {
    /// Whether the entry satisfies a filter.
    pub fn matches(&self, filter: &Filter) -> bool {
        filter.matches(self)
    }

    /// Add a tag once.
    pub fn add_tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Remove a tag if present.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }
}
