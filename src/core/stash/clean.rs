//! Clean operation.

use std::path::Path;

use tracing::debug;

use super::{Selection, Stash};
use crate::core::report::Report;
use crate::error::{Error, Result};

impl Stash {
    /// Delete the local copies of selected files.
    ///
    /// Files already gone are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoMatch` if nothing matches the selection.
    pub fn clean(&self, selection: &Selection) -> Result<Report<String>> {
        let mut report = Report::new();
        let matches = self.catalog.select(&selection.read_filter())?;

        for entry in matches.into_values() {
            if !Path::new(&entry.path).exists() {
                continue;
            }
            match std::fs::remove_file(&entry.path) {
                Ok(()) => {
                    debug!(path = %entry.path, "removed");
                    report.push(entry.path);
                }
                Err(e) => {
                    let err = Error::file(&entry.path, e);
                    report.fail(entry.path, err);
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::super::SyncOptions;
    use super::*;

    #[test]
    fn test_clean_deletes_existing_only() {
        let f = Fixture::new();
        let a = f.write("a/.env", "A=1\n");
        let b = f.write("b/.env", "B=1\n");
        let mut stash = f.stash();
        stash
            .sync(SyncOptions {
                files: vec![a.clone(), b.clone()],
                service: "parameter-store".into(),
                context: Some("app".into()),
                no_clean: true,
                ..SyncOptions::default()
            })
            .unwrap();
        std::fs::remove_file(&b).unwrap();

        let report = stash.clean(&Selection::default()).unwrap();
        assert_eq!(report.items, vec![a.clone()]);
        assert!(!Path::new(&a).exists());
    }
}
