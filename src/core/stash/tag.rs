//! Tag operation.

use tracing::info;

use super::{Selection, Stash};
use crate::core::report::Report;
use crate::error::Result;

/// Inputs for [`Stash::tag`].
#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    pub selection: Selection,
    /// Tags to add.
    pub add: Vec<String>,
    /// Tags to remove.
    pub delete: Vec<String>,
}

/// One entry whose tags changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged {
    pub path: String,
    pub tags: Vec<String>,
}

impl Stash {
    /// Edit tags on selected entries.
    ///
    /// Adds and removals apply to every entry matching the selection.
    /// Without either, explicit files or a service get their tags replaced
    /// by the selection's tags.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoMatch` if nothing matches the selection.
    pub fn tag(&mut self, options: TagOptions) -> Result<Report<Tagged>> {
        let mut report = Report::new();
        let editing = !options.add.is_empty() || !options.delete.is_empty();

        let filter = if editing {
            options.selection.read_filter()
        } else {
            let mut filter = options.selection.read_filter();
            filter.tags.clear();
            filter
        };
        let replace = !editing
            && !options.selection.tags.is_empty()
            && (!options.selection.files.is_empty() || !options.selection.service.is_empty());

        let matches = self.catalog.select(&filter)?;

        for key in matches.keys() {
            let Some(entry) = self.catalog.files.get_mut(key) else {
                continue;
            };
            let before = entry.tags.clone();

            if replace {
                entry.tags = options.selection.tags.clone();
            }
            for tag in &options.add {
                entry.add_tag(tag);
            }
            for tag in &options.delete {
                entry.remove_tag(tag);
            }

            if entry.tags != before {
                info!(path = %entry.path, tags = ?entry.tags, "tagged");
                report.push(Tagged {
                    path: entry.path.clone(),
                    tags: entry.tags.clone(),
                });
            }
        }

        if !report.items.is_empty() {
            self.save()?;
        }
        Ok(report)
    }
}
