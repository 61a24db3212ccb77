//! Get operation.

use std::path::Path;

use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{fail_group, Selection, Stash};
use crate::core::catalog::{group_by_service, Entry};
use crate::core::dotenv::{self, Pairs};
use crate::core::output::{self, OutputKind};
use crate::core::report::Report;
use crate::core::service::Unit;
use crate::core::types::{CatalogKey, RemoteKey, ServiceKey};
use crate::error::{Error, Result};

/// Inputs for [`Stash::get`].
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub selection: Selection,
    pub output: OutputKind,
}

/// One file fetched from its service, already transformed.
pub struct Downloaded {
    pub key: CatalogKey,
    pub path: String,
    pub service: ServiceKey,
    pub remote_key: RemoteKey,
    pub output: OutputKind,
    pub data: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for Downloaded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloaded")
            .field("key", &self.key)
            .field("path", &self.path)
            .field("service", &self.service)
            .field("remote_key", &self.remote_key)
            .field("output", &self.output)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .finish()
    }
}

impl Stash {
    /// Download selected files.
    ///
    /// Catalog values may reference environment variables. With
    /// [`OutputKind::File`] each file is written back to its path and its
    /// sync state recorded; other outputs are returned for the caller.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoMatch` if nothing matches the selection.
    pub fn get(&mut self, options: GetOptions) -> Result<Report<Downloaded>> {
        let mut report = Report::new();

        let mut catalog = self.catalog.clone();
        catalog.expand_env();
        let matches = catalog.select(&options.selection.read_filter())?;

        for (service_key, entries) in group_by_service(matches) {
            if let Err(err) = self.prepare(&service_key) {
                fail_group(&mut report, &err, &service_key, &entries);
                continue;
            }

            for (key, entry) in entries {
                match self.download_entry(&catalog.context, &service_key, &key, &entry, options.output) {
                    Ok(item) => report.push(item),
                    Err(err) => {
                        warn!(path = %entry.path, error = %err, "download failed");
                        report.fail(entry.path, err);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Download selected files and merge them into one environment map.
    ///
    /// Every file is parsed as dotenv; later files override earlier keys.
    ///
    /// # Errors
    ///
    /// Returns error if nothing matches, if any download fails, or if a
    /// downloaded file is not valid dotenv.
    pub fn get_map(&mut self, selection: Selection) -> Result<Pairs> {
        let downloads = self
            .get(GetOptions {
                selection,
                output: OutputKind::Original,
            })?
            .into_result("get")?;

        let mut values = Pairs::new();
        for download in downloads {
            let pairs = dotenv::parse_bytes(&download.data)?;
            debug!(path = %download.path, keys = pairs.len(), "merged");
            values.extend(pairs);
        }
        Ok(values)
    }

    fn download_entry(
        &mut self,
        context: &str,
        service_key: &str,
        key: &str,
        entry: &Entry,
        output: OutputKind,
    ) -> Result<Downloaded> {
        let service = self.registry.get_mut(service_key)?;
        let unit = Unit::for_entry(context, key, entry, &**service, Vec::new(), None);
        let remote_key = unit.remote_key.clone();

        let result = service.download(unit, output)?;
        let data = output::select(output, &entry.file_type).transform(&result.data)?;
        debug!(path = %entry.path, output = %output, bytes = data.len(), "downloaded");

        if output == OutputKind::File {
            write_file(&entry.path, &data)?;
            self.state.record(context, &entry.path)?;
        }

        Ok(Downloaded {
            key: key.to_string(),
            path: entry.path.clone(),
            service: service_key.to_string(),
            remote_key,
            output,
            data: Zeroizing::new(data),
        })
    }
}

fn write_file(path: &str, data: &[u8]) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }
    }
    std::fs::write(path, data).map_err(|e| Error::file(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| Error::file(path, e))?;
    }

    Ok(())
}
