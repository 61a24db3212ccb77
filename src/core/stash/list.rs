//! List operation.

use std::collections::BTreeMap;

use super::{Selection, Stash};
use crate::core::catalog::Entry;
use crate::core::types::{CatalogKey, ServiceKey};
use crate::error::Result;

/// Cataloged entries of one service, sorted by path.
pub type Listed = BTreeMap<ServiceKey, Vec<(CatalogKey, Entry)>>;

impl Stash {
    /// Selected entries grouped by service.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoMatch` if nothing matches the selection.
    pub fn list(&self, selection: &Selection) -> Result<Listed> {
        let matches = self.catalog.select(&selection.read_filter())?;

        let mut listed = Listed::new();
        for (key, entry) in matches {
            listed.entry(entry.service.clone()).or_default().push((key, entry));
        }
        for entries in listed.values_mut() {
            entries.sort_by(|a, b| a.1.path.cmp(&b.1.path));
        }
        Ok(listed)
    }
}
