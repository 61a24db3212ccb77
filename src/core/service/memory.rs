//! In-memory stores.
//!
//! Implement the client traits over plain maps. Clones share state, so a test
//! can keep a handle while a service owns another. A store bound to a file
//! reloads from it on creation and writes back after every mutation; this is
//! the local emulation used when no cloud transport is compiled in.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::client::{
    BlobClient, Object, Parameter, ParameterVersion, Secret, SecretClient, SecretLookup,
    TreeClient,
};
use crate::core::types::Synced;
use crate::error::{Error, Result};

const ACCOUNT: &str = "000000000000";
const REGION: &str = "local";

fn load<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(T::default()),
        Ok(contents) => serde_yaml::from_str(&contents)
            .map_err(|e| Error::Other(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(Error::file(path, e)),
    }
}

fn flush<T: Serialize>(path: Option<&PathBuf>, state: &T) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
    }
    let yaml = serde_yaml::to_string(state).map_err(|e| Error::Other(e.to_string()))?;
    std::fs::write(path, yaml).map_err(|e| Error::file(path, e))?;
    trace!(path = %path.display(), "flushed local store");
    Ok(())
}

fn not_found(service: &str, name: &str) -> Error {
    Error::remote(service, format!("{} not found", name))
}

// ---------------------------------------------------------------------------
// Blobs
// ---------------------------------------------------------------------------

#[derive(Default, Serialize, Deserialize)]
struct BlobState {
    #[serde(default)]
    buckets: BTreeMap<String, BTreeMap<String, Object>>,
}

/// In-memory object storage. Buckets are created on first write.
#[derive(Clone, Default)]
pub struct MemoryBlobs {
    state: Rc<RefCell<BlobState>>,
    file: Option<PathBuf>,
}

impl MemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store persisted to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if an existing file cannot be read or parsed.
    pub fn persistent(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Ok(Self {
            state: Rc::new(RefCell::new(load(&path)?)),
            file: Some(path),
        })
    }

    /// Current body of an object.
    pub fn body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .buckets
            .get(bucket)
            .and_then(|b| b.get(key))
            .map(|o| o.body.clone())
    }

    /// Overwrite an object as an external writer would.
    pub fn write_external(&self, bucket: &str, key: &str, body: &[u8], at: Synced) {
        self.state
            .borrow_mut()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(
                key.to_string(),
                Object {
                    body: body.to_vec(),
                    last_modified: Some(at),
                },
            );
    }
}

impl BlobClient for MemoryBlobs {
    fn get_object(&mut self, bucket: &str, key: &str) -> Result<Option<Object>> {
        Ok(self
            .state
            .borrow()
            .buckets
            .get(bucket)
            .and_then(|b| b.get(key))
            .cloned())
    }

    fn put_object(&mut self, bucket: &str, key: &str, body: &[u8], _kms_key_id: Option<&str>) -> Result<()> {
        self.write_external(bucket, key, body, Utc::now());
        flush(self.file.as_ref(), &*self.state.borrow())
    }

    fn delete_object(&mut self, bucket: &str, key: &str) -> Result<()> {
        if let Some(b) = self.state.borrow_mut().buckets.get_mut(bucket) {
            b.remove(key);
        }
        flush(self.file.as_ref(), &*self.state.borrow())
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Clone, Serialize, Deserialize)]
struct StoredParameter {
    value: String,
    kind: String,
    last_modified: Synced,
    history: Vec<ParameterVersion>,
}

#[derive(Default, Serialize, Deserialize)]
struct TreeState {
    #[serde(default)]
    parameters: BTreeMap<String, StoredParameter>,
}

/// In-memory hierarchical parameters with version history.
#[derive(Clone, Default)]
pub struct MemoryTree {
    state: Rc<RefCell<TreeState>>,
    file: Option<PathBuf>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store persisted to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if an existing file cannot be read or parsed.
    pub fn persistent(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Ok(Self {
            state: Rc::new(RefCell::new(load(&path)?)),
            file: Some(path),
        })
    }

    /// Current value of a parameter.
    pub fn value(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .parameters
            .get(name)
            .map(|p| p.value.clone())
    }

    /// Every stored parameter name.
    pub fn names(&self) -> Vec<String> {
        self.state.borrow().parameters.keys().cloned().collect()
    }

    /// Restamp a parameter as if it were edited externally at `at`.
    pub fn touch(&self, name: &str, at: Synced) {
        if let Some(p) = self.state.borrow_mut().parameters.get_mut(name) {
            p.last_modified = at;
        }
    }

    fn arn(name: &str) -> String {
        format!("arn:aws:ssm:{}:{}:parameter{}", REGION, ACCOUNT, name)
    }
}

impl TreeClient for MemoryTree {
    fn get_by_path(&mut self, path: &str) -> Result<Vec<Parameter>> {
        let prefix = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{}/", path)
        };

        Ok(self
            .state
            .borrow()
            .parameters
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(name, p)| Parameter {
                name: name.clone(),
                value: p.value.clone(),
                kind: p.kind.clone(),
                last_modified: Some(p.last_modified),
                arn: Self::arn(name),
            })
            .collect())
    }

    fn history(&mut self, name: &str) -> Result<Vec<ParameterVersion>> {
        self.state
            .borrow()
            .parameters
            .get(name)
            .map(|p| p.history.clone())
            .ok_or_else(|| not_found("parameter-store", name))
    }

    fn put_parameter(&mut self, name: &str, value: &str, key_id: Option<&str>) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let now = Utc::now();
            let entry = state
                .parameters
                .entry(name.to_string())
                .or_insert_with(|| StoredParameter {
                    value: String::new(),
                    kind: "SecureString".into(),
                    last_modified: now,
                    history: Vec::new(),
                });

            let version = entry.history.last().map(|h| h.version).unwrap_or(0) + 1;
            entry.value = value.to_string();
            entry.kind = "SecureString".into();
            entry.last_modified = now;
            entry.history.push(ParameterVersion {
                version,
                key_id: key_id.map(|k| format!("alias/{}", k.trim_start_matches("alias/"))),
            });
        }
        flush(self.file.as_ref(), &*self.state.borrow())
    }

    fn delete_parameter(&mut self, name: &str) -> Result<()> {
        if self.state.borrow_mut().parameters.remove(name).is_none() {
            return Err(not_found("parameter-store", name));
        }
        flush(self.file.as_ref(), &*self.state.borrow())
    }
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

#[derive(Clone, Serialize, Deserialize)]
struct StoredSecret {
    value: String,
    key_id: Option<String>,
    description: String,
    last_changed: Synced,
    #[serde(default)]
    deleted: bool,
}

#[derive(Default, Serialize, Deserialize)]
struct SecretState {
    #[serde(default)]
    secrets: BTreeMap<String, StoredSecret>,
}

/// In-memory discrete secrets with soft delete.
#[derive(Clone, Default)]
pub struct MemorySecrets {
    state: Rc<RefCell<SecretState>>,
    file: Option<PathBuf>,
}

impl MemorySecrets {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store persisted to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if an existing file cannot be read or parsed.
    pub fn persistent(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Ok(Self {
            state: Rc::new(RefCell::new(load(&path)?)),
            file: Some(path),
        })
    }

    /// Current value of a live secret.
    pub fn value(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .secrets
            .get(name)
            .filter(|s| !s.deleted)
            .map(|s| s.value.clone())
    }

    /// Whether a secret is scheduled for deletion.
    pub fn is_deleted(&self, name: &str) -> bool {
        self.state
            .borrow()
            .secrets
            .get(name)
            .map(|s| s.deleted)
            .unwrap_or(false)
    }

    /// Restamp a secret as if it were edited externally at `at`.
    pub fn touch(&self, name: &str, at: Synced) {
        if let Some(s) = self.state.borrow_mut().secrets.get_mut(name) {
            s.last_changed = at;
        }
    }

    fn arn(name: &str) -> String {
        format!("arn:aws:secretsmanager:{}:{}:secret:{}", REGION, ACCOUNT, name)
    }

    fn with_live<T>(&self, name: &str, f: impl FnOnce(&mut StoredSecret) -> T) -> Result<T> {
        let mut state = self.state.borrow_mut();
        match state.secrets.get_mut(name) {
            Some(s) if !s.deleted => Ok(f(s)),
            Some(_) => Err(Error::remote(
                "secrets-manager",
                format!("{} is scheduled for deletion", name),
            )),
            None => Err(not_found("secrets-manager", name)),
        }
    }
}

impl SecretClient for MemorySecrets {
    fn lookup(&mut self, name: &str) -> Result<SecretLookup> {
        Ok(match self.state.borrow().secrets.get(name) {
            None => SecretLookup::Missing,
            Some(s) if s.deleted => SecretLookup::Deleted,
            Some(s) => SecretLookup::Found(Secret {
                name: name.to_string(),
                value: s.value.clone(),
                key_id: s.key_id.clone(),
                last_changed: Some(s.last_changed),
                arn: Self::arn(name),
            }),
        })
    }

    fn create(&mut self, name: &str, value: &str, key_id: Option<&str>, description: &str) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.secrets.contains_key(name) {
                return Err(Error::remote(
                    "secrets-manager",
                    format!("{} already exists", name),
                ));
            }
            state.secrets.insert(
                name.to_string(),
                StoredSecret {
                    value: value.to_string(),
                    key_id: key_id.map(str::to_string),
                    description: description.to_string(),
                    last_changed: Utc::now(),
                    deleted: false,
                },
            );
        }
        flush(self.file.as_ref(), &*self.state.borrow())
    }

    fn update(&mut self, name: &str, value: &str, key_id: Option<&str>) -> Result<()> {
        self.with_live(name, |s| {
            s.value = value.to_string();
            s.key_id = key_id.map(str::to_string);
            s.last_changed = Utc::now();
        })?;
        flush(self.file.as_ref(), &*self.state.borrow())
    }

    fn restore(&mut self, name: &str) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            match state.secrets.get_mut(name) {
                Some(s) => s.deleted = false,
                None => return Err(not_found("secrets-manager", name)),
            }
        }
        flush(self.file.as_ref(), &*self.state.borrow())
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        self.with_live(name, |s| {
            s.deleted = true;
            s.last_changed = Utc::now();
        })?;
        flush(self.file.as_ref(), &*self.state.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_blobs_roundtrip_and_shared_state() {
        let mut store = MemoryBlobs::new();
        let handle = store.clone();

        assert!(store.get_object("b", "k").unwrap().is_none());
        store.put_object("b", "k", b"data", None).unwrap();
        assert_eq!(handle.body("b", "k"), Some(b"data".to_vec()));

        store.delete_object("b", "k").unwrap();
        assert!(handle.body("b", "k").is_none());
    }

    #[test]
    fn test_tree_path_listing_and_history() {
        let mut tree = MemoryTree::new();
        tree.put_parameter("/app/env/A", "1", None).unwrap();
        tree.put_parameter("/app/env/A", "2", Some("custom")).unwrap();
        tree.put_parameter("/app/other/B", "3", None).unwrap();

        let found = tree.get_by_path("/app/env").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "2");
        assert!(found[0].arn.ends_with("parameter/app/env/A"));

        let history = tree.history("/app/env/A").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].version, 2);
        assert_eq!(history[1].key_id.as_deref(), Some("alias/custom"));
    }

    #[test]
    fn test_secrets_soft_delete_and_restore() {
        let mut secrets = MemorySecrets::new();
        secrets.create("app/db", "{}", None, "d").unwrap();
        secrets.delete("app/db").unwrap();

        assert!(matches!(secrets.lookup("app/db").unwrap(), SecretLookup::Deleted));
        assert!(secrets.create("app/db", "{}", None, "d").is_err());
        assert!(secrets.update("app/db", "{}", None).is_err());

        secrets.restore("app/db").unwrap();
        secrets.update("app/db", "{\"a\":1}", None).unwrap();
        assert_eq!(secrets.value("app/db").as_deref(), Some("{\"a\":1}"));
        assert!(matches!(secrets.lookup("nope").unwrap(), SecretLookup::Missing));
    }

    #[test]
    fn test_persistent_store_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remote").join("parameter-store.yml");

        let mut tree = MemoryTree::persistent(&path).unwrap();
        tree.put_parameter("/app/A", "1", None).unwrap();

        let reloaded = MemoryTree::persistent(&path).unwrap();
        assert_eq!(reloaded.value("/app/A").as_deref(), Some("1"));
    }
}
