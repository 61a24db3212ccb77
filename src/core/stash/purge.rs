//! Purge operation.

use tracing::{info, warn};

use super::{fail_group, Selection, Stash};
use crate::core::catalog::{group_by_service, Entry};
use crate::core::report::Report;
use crate::core::service::Unit;
use crate::core::types::{CatalogKey, RemoteKey, ServiceKey};
use crate::error::{Error, Result, ServiceError};

const CONFIRM_PROMPT: &str = "Enter above remote key to confirm delete?";

/// Inputs for [`Stash::purge`].
#[derive(Debug, Clone, Default)]
pub struct PurgeOptions {
    pub selection: Selection,
    /// Ask for the remote key before deleting.
    pub warn: bool,
}

/// One file whose remote data was deleted.
#[derive(Debug, Clone)]
pub struct Purged {
    pub key: CatalogKey,
    pub path: String,
    pub service: ServiceKey,
    pub remote_key: RemoteKey,
    /// The entry left the catalog.
    pub removed: bool,
}

impl Stash {
    /// Delete remote data for selected files; local files are untouched.
    ///
    /// Entries with no remaining remote keys leave the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoMatch` if nothing matches the selection.
    pub fn purge(&mut self, options: PurgeOptions) -> Result<Report<Purged>> {
        let mut report = Report::new();
        let matches = self.catalog.select(&options.selection.read_filter())?;

        for (service_key, entries) in group_by_service(matches) {
            if let Err(err) = self.prepare(&service_key) {
                fail_group(&mut report, &err, &service_key, &entries);
                continue;
            }

            for (key, entry) in entries {
                match self.purge_entry(&service_key, &key, &entry, options.warn) {
                    Ok(Some(item)) => report.push(item),
                    Ok(None) => report.warn(format!("{}: skipped", entry.path)),
                    Err(err) => {
                        warn!(path = %entry.path, error = %err, "purge failed");
                        report.fail(entry.path, err);
                    }
                }
            }
        }

        Ok(report)
    }

    fn purge_entry(
        &mut self,
        service_key: &str,
        key: &str,
        entry: &Entry,
        confirm: bool,
    ) -> Result<Option<Purged>> {
        let context = self.catalog.context.clone();
        let service = self.registry.get_mut(service_key)?;
        let unit = Unit::for_entry(&context, key, entry, &**service, Vec::new(), None);
        let remote_key = unit.remote_key.clone();

        if confirm && !entry.keys.is_empty() {
            let help = format!("{}: {}", entry.path, remote_key);
            let answer = match self.io.input(CONFIRM_PROMPT, None, Some(&help)) {
                Err(Error::Service(ServiceError::MissingOption(_))) => {
                    return Err(Error::Prompt("confirming a purge requires a terminal".into()))
                }
                other => other?,
            };
            if answer.trim() != remote_key {
                return Ok(None);
            }
        }

        let service = self.registry.get_mut(service_key)?;
        let result = service.purge(unit)?;

        let removed = result.keys.is_empty();
        if removed {
            self.catalog.remove(key);
        } else {
            self.catalog.merge(key, &result.keys, &result.options);
        }
        self.state.record(&context, &entry.path)?;
        self.save()?;
        info!(path = %entry.path, remote_key = %remote_key, removed, "purged");

        Ok(Some(Purged {
            key: key.to_string(),
            path: entry.path.clone(),
            service: service_key.to_string(),
            remote_key,
            removed,
        }))
    }
}
