//! Store clients.
//!
//! The wire boundary of each service shape. A service owns one client and
//! never talks to a transport directly, so the same reconciliation runs
//! against the local store emulation, an in-memory store in tests, or AWS.

use serde::{Deserialize, Serialize};

use crate::core::types::Synced;
use crate::error::Result;

/// A stored blob.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub body: Vec<u8>,
    pub last_modified: Option<Synced>,
}

/// Flat object storage (S3 shaped).
pub trait BlobClient {
    /// Fetch an object; `None` when the key does not exist.
    ///
    /// Returns [`crate::error::ServiceError::NoSuchBucket`] when the bucket
    /// is missing.
    fn get_object(&mut self, bucket: &str, key: &str) -> Result<Option<Object>>;

    /// Write an object, encrypted with `kms_key_id` or the store default.
    fn put_object(&mut self, bucket: &str, key: &str, body: &[u8], kms_key_id: Option<&str>) -> Result<()>;

    fn delete_object(&mut self, bucket: &str, key: &str) -> Result<()>;
}

/// A parameter as returned by a path listing, decrypted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub kind: String,
    pub last_modified: Option<Synced>,
    pub arn: String,
}

/// One historical version of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterVersion {
    pub version: i64,
    pub key_id: Option<String>,
}

/// Hierarchical key/value storage (Parameter Store shaped).
pub trait TreeClient {
    /// Every parameter below `path`, recursively.
    fn get_by_path(&mut self, path: &str) -> Result<Vec<Parameter>>;

    /// Version history of one parameter.
    fn history(&mut self, name: &str) -> Result<Vec<ParameterVersion>>;

    /// Write an encrypted parameter, overwriting any existing value.
    fn put_parameter(&mut self, name: &str, value: &str, key_id: Option<&str>) -> Result<()>;

    fn delete_parameter(&mut self, name: &str) -> Result<()>;
}

/// A live secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub value: String,
    pub key_id: Option<String>,
    pub last_changed: Option<Synced>,
    pub arn: String,
}

/// Result of looking a secret up by name.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretLookup {
    Found(Secret),
    /// Scheduled for deletion and still recoverable.
    Deleted,
    Missing,
}

/// Discrete secret storage (Secrets Manager shaped).
pub trait SecretClient {
    fn lookup(&mut self, name: &str) -> Result<SecretLookup>;

    fn create(&mut self, name: &str, value: &str, key_id: Option<&str>, description: &str) -> Result<()>;

    fn update(&mut self, name: &str, value: &str, key_id: Option<&str>) -> Result<()>;

    /// Cancel a scheduled deletion.
    fn restore(&mut self, name: &str) -> Result<()>;

    /// Schedule a secret for deletion.
    fn delete(&mut self, name: &str) -> Result<()>;
}
