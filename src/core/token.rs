//! Token references.
//!
//! A token is `${key}` or `${key::field}` inside arbitrary text. `key` names a
//! remote key; `field` selects one env key from the downloaded value.

use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::error::{CatalogError, Result};

/// Placeholder pattern; never spans a newline.
const PATTERN: &str = r"\$\{(.+?)\}";

/// Separates the remote key from the field name.
const FIELD_SEPARATOR: &str = "::";

/// What a token points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub key: String,
    pub field: Option<String>,
}

impl Reference {
    /// Parse the inside of `${...}`.
    pub fn parse(inner: &str) -> Self {
        match inner.split_once(FIELD_SEPARATOR) {
            Some((key, field)) => Self {
                key: key.to_string(),
                field: Some(field.to_string()),
            },
            None => Self {
                key: inner.to_string(),
                field: None,
            },
        }
    }
}

/// Every distinct placeholder in `text`, keyed by its literal span.
///
/// # Errors
///
/// Returns error if the placeholder pattern fails to compile.
pub fn find(text: &str) -> Result<BTreeMap<String, Reference>> {
    let pattern = Regex::new(PATTERN).map_err(|e| CatalogError::Pattern(e.to_string()))?;

    Ok(pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?.as_str().to_string();
            let inner = caps.get(1)?.as_str();
            Some((whole, Reference::parse(inner)))
        })
        .collect())
}

/// Substitute resolved placeholders in one pass; unresolved ones stay as
/// written and substituted values are never scanned again.
///
/// # Errors
///
/// Returns error if the placeholder pattern fails to compile.
pub fn replace(text: &str, values: &BTreeMap<String, String>) -> Result<String> {
    let pattern = Regex::new(PATTERN).map_err(|e| CatalogError::Pattern(e.to_string()))?;

    Ok(pattern
        .replace_all(text, |caps: &Captures<'_>| {
            values
                .get(&caps[0])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned())
}
