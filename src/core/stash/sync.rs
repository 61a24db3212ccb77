//! Sync operation.
//!
//! Catalogs new files, then pushes every selected file to its service.

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{fail_group, Stash};
use crate::core::catalog::{group_by_service, Catalog, Entry, Filter};
use crate::core::path;
use crate::core::report::Report;
use crate::core::service::Unit;
use crate::core::types::{CatalogKey, RemoteKey, ServiceKey};
use crate::error::{CatalogError, Error, Result, ServiceError};

const CONTEXT_PROMPT: &str = "Context";
const CONTEXT_HELP: &str = "Prefix for every remote key, e.g. the application name.";
const CLEAN_PROMPT: &str = "Delete local copy?";
const CLEAN_HELP: &str = "Remove local files after each successful sync.";
const SEARCH_PROMPT: &str = "Select files";

/// Inputs for [`Stash::sync`].
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Paths, or regular expressions matched against paths under the
    /// working directory.
    pub files: Vec<String>,
    pub tags: Vec<String>,
    /// Service for files not yet cataloged.
    pub service: String,
    /// Context for a new catalog; skips the setup prompts.
    pub context: Option<String>,
    /// Keep local files even when the catalog cleans.
    pub no_clean: bool,
}

/// One file pushed to its service.
#[derive(Debug, Clone)]
pub struct SyncedFile {
    pub key: CatalogKey,
    pub path: String,
    pub service: ServiceKey,
    pub remote_key: RemoteKey,
    pub keys: usize,
    pub cleaned: bool,
}

impl Stash {
    /// Sync local files to their services.
    ///
    /// Creates the catalog on first use, catalogs any new files, and pushes
    /// every match. A file that fails is reported and the rest continue.
    ///
    /// # Errors
    ///
    /// Returns error if the catalog cannot be set up or saved, or if a
    /// non-empty selection matches no cataloged file.
    pub fn sync(&mut self, options: SyncOptions) -> Result<Report<SyncedFile>> {
        let mut report = Report::new();

        if self.fresh {
            self.init_catalog(&options)?;
        }

        let files = self.resolve_files(&options.files)?;
        if !options.files.is_empty() && files.is_empty() {
            debug!("no files selected");
            return Ok(report);
        }

        for file in &files {
            if self.catalog.get_file(file).is_none() {
                let service = self.choose_service(file, &options.service)?;
                let key = self.catalog.add_file(None, file, &service, &options.tags)?;
                info!(key = %key, path = %file, service = %service, "cataloged file");
            }
        }

        let filter = Filter::write(files, options.tags.clone(), options.service.clone());
        let matches = if filter.is_empty() {
            self.catalog.filter(&filter)
        } else {
            self.catalog.select(&filter)?
        };
        self.save()?;

        for (service_key, entries) in group_by_service(matches) {
            if let Err(err) = self.prepare(&service_key) {
                fail_group(&mut report, &err, &service_key, &entries);
                continue;
            }

            for (key, entry) in entries {
                match self.sync_entry(&service_key, &key, &entry, options.no_clean) {
                    Ok(item) => report.push(item),
                    Err(err) => {
                        warn!(path = %entry.path, error = %err, "sync failed");
                        report.fail(entry.path, err);
                    }
                }
            }
        }

        Ok(report)
    }

    fn sync_entry(
        &mut self,
        service_key: &str,
        key: &str,
        entry: &Entry,
        no_clean: bool,
    ) -> Result<SyncedFile> {
        let data = std::fs::read(&entry.path).map_err(|e| Error::file(&entry.path, e))?;
        let context = self.catalog.context.clone();
        let synced = self.state.lookup(&context, &entry.path)?;

        let service = self.registry.get_mut(service_key)?;
        let unit = Unit::for_entry(&context, key, entry, &**service, data, synced);
        let remote_key = unit.remote_key.clone();
        debug!(path = %entry.path, remote_key = %remote_key, "syncing");

        let result = service.sync(unit)?;
        self.catalog.merge(key, &result.keys, &result.options);
        self.state.record(&context, &entry.path)?;
        self.save()?;

        let cleaned = !no_clean && (self.catalog.clean || entry.clean);
        if cleaned {
            std::fs::remove_file(&entry.path).map_err(|e| Error::file(&entry.path, e))?;
            debug!(path = %entry.path, "removed local copy");
        }

        Ok(SyncedFile {
            key: key.to_string(),
            path: entry.path.clone(),
            service: service_key.to_string(),
            remote_key,
            keys: result.keys.len(),
            cleaned,
        })
    }

    fn init_catalog(&mut self, options: &SyncOptions) -> Result<()> {
        let (context, clean) = match &options.context {
            Some(context) => (context.clone(), !options.no_clean),
            None => {
                let default = default_context();
                let context = self
                    .io
                    .input(CONTEXT_PROMPT, Some(default.as_str()), Some(CONTEXT_HELP))?;
                let clean =
                    !options.no_clean && self.io.confirm(CLEAN_PROMPT, Some(CLEAN_HELP), true)?;
                (context, clean)
            }
        };

        if !is_valid_context(&context) {
            return Err(CatalogError::InvalidContext(context).into());
        }

        info!(context = %context, clean, path = %self.catalog_path.display(), "creating catalog");
        self.catalog = Catalog::new(context, clean);
        self.fresh = false;
        Ok(())
    }

    /// Turn sync arguments into local paths.
    ///
    /// Existing files and cataloged paths pass through. Anything else is a
    /// pattern: matching files are offered for selection.
    fn resolve_files(&self, args: &[String]) -> Result<Vec<String>> {
        let mut files: Vec<String> = Vec::new();
        let mut found: Vec<String> = Vec::new();

        for arg in args {
            if Path::new(arg).is_file() || self.catalog.get_file(arg).is_some() {
                push_unique(&mut files, arg.clone());
                continue;
            }

            let matched = self.search(arg)?;
            if matched.is_empty() {
                return Err(CatalogError::NoMatch(arg.clone()).into());
            }
            for m in matched {
                push_unique(&mut found, m);
            }
        }

        if !found.is_empty() {
            for i in self.io.multi_select(SEARCH_PROMPT, &found)? {
                push_unique(&mut files, found[i].clone());
            }
        }

        Ok(files)
    }

    /// Files under the working directory whose path matches `pattern`.
    fn search(&self, pattern: &str) -> Result<Vec<String>> {
        let re = Regex::new(pattern).map_err(|e| CatalogError::Pattern(e.to_string()))?;
        let catalog_name = self.catalog_path.file_name();

        let mut matched = Vec::new();
        for entry in WalkDir::new(".")
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() || Some(entry.file_name()) == catalog_name {
                continue;
            }

            let rel = entry.path().strip_prefix(".").unwrap_or(entry.path());
            let rel = rel.to_string_lossy().replace('\\', "/");
            if re.is_match(&rel) {
                matched.push(rel);
            }
        }

        debug!(pattern, found = matched.len(), "searched files");
        Ok(matched)
    }

    /// Service for a new file: the requested one, or a choice among the
    /// compatible services, most secure first.
    fn choose_service(&self, file: &str, requested: &str) -> Result<ServiceKey> {
        let file_type = path::file_type(file);

        if !requested.is_empty() {
            let service = self
                .registry
                .get(requested)
                .ok_or_else(|| ServiceError::Unavailable(requested.to_string()))?;
            if !service.compatible(&[file_type.as_str()]) {
                return Err(ServiceError::Incompatible {
                    service: requested.to_string(),
                    file_type,
                }
                .into());
            }
            return Ok(requested.to_string());
        }

        let keys: Vec<&'static str> = self
            .registry
            .compatible(&[file_type.as_str()])
            .iter()
            .map(|s| s.key())
            .collect();
        if keys.is_empty() {
            return Err(ServiceError::Incompatible {
                service: "any service".into(),
                file_type,
            }
            .into());
        }

        let default = self
            .catalog
            .lookup_service(file)
            .and_then(|used| keys.iter().position(|k| *k == used))
            .unwrap_or(0);
        let items: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let chosen = self.io.select(&format!("Stash [{}]", file), &items, default)?;

        Ok(keys[chosen].to_string())
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn is_valid_context(context: &str) -> bool {
    !context.is_empty() && context.chars().all(|c| c.is_ascii_lowercase() || c == '-')
}

/// Working directory name, reduced to a valid context.
fn default_context() -> String {
    let name = std::env::current_dir()
        .ok()
        .and_then(|d| d.file_name().map(|n| n.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    let reduced = path::sanitize(&name, |c| c.is_ascii_lowercase(), '-');
    let trimmed = reduced.trim_matches('-');
    if trimmed.is_empty() {
        "stash".to_string()
    } else {
        trimmed.to_string()
    }
}
