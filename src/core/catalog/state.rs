//! Sync state.
//!
//! Records when each (context, path) was last confirmed in sync. Lives in the
//! per-user directory so it survives catalog deletion and never gets
//! committed with the project.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::{STATE_FILE, SYNC_SKEW_SECS};
use crate::core::home;
use crate::core::path::initial_key;
use crate::core::types::Synced;
use crate::error::{CatalogError, Error, Result};

/// One state record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub synced: Synced,
}

/// File-backed sync state.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// State stored at an explicit location.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State stored in the per-user directory.
    ///
    /// # Errors
    ///
    /// Returns error if no home directory can be determined.
    pub fn open() -> Result<Self> {
        Ok(Self::new(home::path(STATE_FILE)?))
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last confirmed sync for a path, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the state file exists but cannot be read or parsed.
    pub fn lookup(&self, context: &str, path: &str) -> Result<Option<Synced>> {
        let states = self.load()?;
        Ok(states.get(&state_key(context, path)).map(|s| s.synced))
    }

    /// Record a sync that just completed.
    ///
    /// The stored instant is pushed forward to absorb remote timestamp lag.
    ///
    /// # Errors
    ///
    /// Returns error if the state file cannot be read or written.
    pub fn record(&self, context: &str, path: &str) -> Result<Synced> {
        let mut states = self.load()?;
        let synced = Utc::now() + Duration::seconds(SYNC_SKEW_SECS);

        states.insert(state_key(context, path), State { synced });
        self.save(&states)?;

        debug!(context, path, %synced, "recorded sync state");
        Ok(synced)
    }

    fn load(&self) -> Result<BTreeMap<String, State>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(Error::file(&self.path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_yaml::from_str(&contents).map_err(|e| CatalogError::State(e.to_string()).into())
    }

    fn save(&self, states: &BTreeMap<String, State>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }

        let yaml =
            serde_yaml::to_string(states).map_err(|e| CatalogError::State(e.to_string()))?;
        std::fs::write(&self.path, yaml).map_err(|e| Error::file(&self.path, e))
    }
}

/// State key for a (context, path) pair.
pub fn state_key(context: &str, path: &str) -> String {
    format!("{}_{}", context, initial_key(path))
}
