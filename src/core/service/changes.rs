//! Change set computation.
//!
//! Compares the local key set with the tracked remote keys and decides what
//! to create, update, and delete, and which remote keys changed since the
//! last sync.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::Io;
use crate::core::constants::OVERWRITE_PROMPT;
use crate::core::types::Synced;
use crate::error::{Result, ServiceError};

/// A single remote key with its metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteSecret {
    pub name: String,
    pub value: String,
    /// Encryption key id, normalized (no `alias/` prefix, defaults filled).
    pub key_id: String,
    /// Store-specific value type (e.g. `SecureString`); empty when unused.
    pub kind: String,
    pub last_modified: Option<Synced>,
    pub arn: String,
}

impl std::fmt::Debug for RemoteSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSecret")
            .field("name", &self.name)
            .field("key_id", &self.key_id)
            .field("kind", &self.kind)
            .field("last_modified", &self.last_modified)
            .finish_non_exhaustive()
    }
}

impl RemoteSecret {
    /// A local value about to be written.
    pub fn local(name: impl Into<String>, value: impl Into<String>, key_id: &str, kind: &str) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            key_id: key_id.to_string(),
            kind: kind.to_string(),
            last_modified: None,
            arn: String::new(),
        }
    }

    /// Whether writing `self` would change `remote`.
    pub fn differs(&self, remote: &RemoteSecret) -> bool {
        self.value != remote.value || self.key_id != remote.key_id || self.kind != remote.kind
    }
}

/// Local and remote sets keyed by remote name.
pub type SecretSet = BTreeMap<String, RemoteSecret>;

/// What a sync must do to converge the remote side.
#[derive(Debug, Default)]
pub struct Changes {
    pub created: Vec<RemoteSecret>,
    pub updated: Vec<RemoteSecret>,
    pub deleted: Vec<RemoteSecret>,
    pub unchanged: Vec<String>,
    /// Remote keys modified after the last confirmed sync.
    pub conflicts: Vec<(String, Option<Synced>)>,
}

impl Changes {
    /// Diff local against remote.
    ///
    /// Every fetched remote key stamped after `synced` is a conflict; when the
    /// entry was never synced, every existing remote key is.
    pub fn compute(local: &SecretSet, remote: &SecretSet, synced: Option<Synced>) -> Self {
        let mut changes = Changes::default();

        for (name, wanted) in local {
            match remote.get(name) {
                None => changes.created.push(wanted.clone()),
                Some(current) if wanted.differs(current) => changes.updated.push(wanted.clone()),
                Some(_) => changes.unchanged.push(name.clone()),
            }
        }

        for (name, current) in remote {
            if !local.contains_key(name) {
                changes.deleted.push(current.clone());
            }

            let modified_after = match (current.last_modified, synced) {
                (Some(modified), Some(synced)) => modified > synced,
                (_, None) => true,
                (None, Some(_)) => false,
            };
            if modified_after {
                changes.conflicts.push((name.clone(), current.last_modified));
            }
        }

        debug!(
            created = changes.created.len(),
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            conflicts = changes.conflicts.len(),
            "computed changes"
        );
        changes
    }

    /// Whether nothing needs writing.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Ask before overwriting externally modified keys.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ConflictAborted`] if the operator declines.
    pub fn confirm(&self, io: &Io) -> Result<()> {
        confirm_overwrite(&self.conflicts, io)
    }
}

/// Ask once about a set of conflicting keys; no-op when there are none.
///
/// # Errors
///
/// Returns [`ServiceError::ConflictAborted`] if the operator declines.
pub fn confirm_overwrite(conflicts: &[(String, Option<Synced>)], io: &Io) -> Result<()> {
    if conflicts.is_empty() {
        return Ok(());
    }

    let mut help = String::from("Modified Remote Keys");
    for (name, modified) in conflicts {
        match modified {
            Some(at) => help.push_str(&format!("\n - {} ({})", name, at.to_rfc3339())),
            None => help.push_str(&format!("\n - {}", name)),
        }
    }

    if io.confirm(OVERWRITE_PROMPT, Some(&help), false)? {
        return Ok(());
    }

    warn!(keys = conflicts.len(), "sync aborted on conflict");
    Err(ServiceError::ConflictAborted.into())
}
