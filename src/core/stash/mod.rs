//! The primary interface for stash operations.
//!
//! A [`Stash`] owns the catalog, the sync state, the service registry, and
//! the prompt channel. Every operation processes files service by service
//! and reports per-file failures without stopping the batch.

mod clean;
mod get;
mod inject;
mod list;
mod purge;
mod sync;
mod tag;

pub use get::{Downloaded, GetOptions};
pub use inject::{InjectOptions, Injected, STDIN};
pub use list::Listed;
pub use purge::{PurgeOptions, Purged};
pub use sync::{SyncOptions, SyncedFile};
pub use tag::{TagOptions, Tagged};

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::catalog::{Catalog, Filter, Matches, StateStore};
use crate::core::service::{Io, Registry};
use crate::error::{Error, Result, ServiceError};

/// Which catalog entries an operation touches.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub files: Vec<String>,
    pub tags: Vec<String>,
    pub service: String,
}

impl Selection {
    pub(super) fn read_filter(&self) -> Filter {
        Filter::read(self.files.clone(), self.tags.clone(), self.service.clone())
    }
}

/// The primary interface for stash operations.
pub struct Stash {
    pub(super) catalog: Catalog,
    pub(super) catalog_path: PathBuf,
    pub(super) state: StateStore,
    pub(super) registry: Registry,
    pub(super) io: Io,
    /// No catalog file existed when opened.
    pub(super) fresh: bool,
}

impl std::fmt::Debug for Stash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stash")
            .field("catalog_path", &self.catalog_path)
            .field("files", &self.catalog.files.len())
            .field("services", &self.registry.keys())
            .field("fresh", &self.fresh)
            .finish()
    }
}

impl Stash {
    /// Open an existing catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the catalog file does not exist.
    /// Returns error if the catalog cannot be parsed.
    pub fn open(
        catalog_path: impl Into<PathBuf>,
        registry: Registry,
        state: StateStore,
        io: Io,
    ) -> Result<Self> {
        let catalog_path = catalog_path.into();
        let catalog = Catalog::load(&catalog_path)?;

        Ok(Self {
            catalog,
            catalog_path,
            state,
            registry,
            io,
            fresh: false,
        })
    }

    /// Open a catalog, starting an empty one when the file is missing.
    ///
    /// The new catalog is initialized and written by the first sync.
    ///
    /// # Errors
    ///
    /// Returns error if an existing catalog cannot be parsed.
    pub fn open_or_new(
        catalog_path: impl Into<PathBuf>,
        registry: Registry,
        state: StateStore,
        io: Io,
    ) -> Result<Self> {
        let catalog_path = catalog_path.into();
        if Catalog::exists(&catalog_path) {
            return Self::open(catalog_path, registry, state, io);
        }

        debug!(path = %catalog_path.display(), "catalog not found, starting new");
        Ok(Self {
            catalog: Catalog::default(),
            catalog_path,
            state,
            registry,
            io,
            fresh: true,
        })
    }

    /// A stash with no catalog, for operations that address remote keys
    /// directly.
    pub fn detached(registry: Registry, state: StateStore, io: Io) -> Self {
        Self {
            catalog: Catalog::default(),
            catalog_path: PathBuf::new(),
            state,
            registry,
            io,
            fresh: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(super) fn save(&self) -> Result<()> {
        self.catalog.save(&self.catalog_path)
    }

    /// Look up and initialize a service before its group runs.
    pub(super) fn prepare(&mut self, service_key: &str) -> Result<()> {
        let io = self.io.clone();
        let service = self.registry.get_mut(service_key)?;
        service.initialize(io).map_err(|e| match e {
            Error::Service(ServiceError::Init { .. }) => e,
            other => ServiceError::Init {
                service: service_key.to_string(),
                reason: other.to_string(),
            }
            .into(),
        })
    }
}

/// A failed group setup, restated for one of its files.
pub(super) fn group_failure(err: &Error, service_key: &str) -> Error {
    match err {
        Error::Service(ServiceError::Unavailable(s)) => ServiceError::Unavailable(s.clone()).into(),
        Error::Service(ServiceError::Init { service, reason }) => ServiceError::Init {
            service: service.clone(),
            reason: reason.clone(),
        }
        .into(),
        other => ServiceError::Init {
            service: service_key.to_string(),
            reason: other.to_string(),
        }
        .into(),
    }
}

/// Record one group-level failure against every file of the group.
pub(super) fn fail_group<T>(
    report: &mut crate::core::report::Report<T>,
    err: &Error,
    service_key: &str,
    entries: &Matches,
) {
    tracing::warn!(service = service_key, error = %err, "skipping service");
    for entry in entries.values() {
        report.fail(entry.path.clone(), group_failure(err, service_key));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::rc::Rc;

    use tempfile::TempDir;

    use super::*;
    use crate::core::constants::CATALOG_FILE;
    use crate::core::service::{Answer, MemoryBlobs, MemorySecrets, MemoryTree, Scripted};

    /// A stash over memory clients rooted in a temp directory.
    pub struct Fixture {
        pub dir: TempDir,
        pub blobs: MemoryBlobs,
        pub tree: MemoryTree,
        pub secrets: MemorySecrets,
        pub prompt: Rc<Scripted>,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                blobs: MemoryBlobs::new(),
                tree: MemoryTree::new(),
                secrets: MemorySecrets::new(),
                prompt: Rc::new(Scripted::new(Vec::<Answer>::new())),
            }
        }

        pub fn path(&self, name: &str) -> String {
            self.dir.path().join(name).to_string_lossy().into_owned()
        }

        pub fn write(&self, name: &str, contents: &str) -> String {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, contents).unwrap();
            path.to_string_lossy().into_owned()
        }

        pub fn stash(&self) -> Stash {
            let registry =
                Registry::memory(self.blobs.clone(), self.tree.clone(), self.secrets.clone());
            let state = StateStore::new(self.dir.path().join("state.yml"));
            let io = Io::new(self.prompt.clone());
            Stash::open_or_new(self.dir.path().join(CATALOG_FILE), registry, state, io).unwrap()
        }
    }
}
