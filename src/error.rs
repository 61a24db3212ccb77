//! Error types.
//!
//! One top-level [`Error`] wraps a domain enum per subsystem so callers can
//! match on the failure class without string inspection.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for every stash operation.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid env line {line}: `{content}`")]
    Env { line: usize, content: String },

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("{failed} of {total} file(s) failed to {action}")]
    Batch {
        action: &'static str,
        failed: usize,
        total: usize,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Catalog and sync-state errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize catalog: {0}")]
    Serialize(String),

    #[error("no files matched {0}")]
    NoMatch(String),

    #[error("catalog key {0} already exists")]
    DuplicateKey(String),

    #[error("invalid sync state: {0}")]
    State(String),

    #[error("invalid search pattern: {0}")]
    Pattern(String),

    #[error("invalid context '{0}': use lower case letters and hyphens")]
    InvalidContext(String),
}

/// Backend and reconciliation errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("service {0} not found")]
    Unavailable(String),

    #[error("service {service} failed to initialize: {reason}")]
    Init { service: String, reason: String },

    #[error("user aborted sync")]
    ConflictAborted,

    #[error("service {service} does not support {file_type} files")]
    Incompatible { service: String, file_type: String },

    #[error("file invalid: {0}")]
    InvalidFile(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("bucket {0} does not exist")]
    NoSuchBucket(String),

    #[error("option {0} is required")]
    MissingOption(String),

    #[error("{service}: {message}")]
    Remote { service: String, message: String },
}

/// Token injection errors.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("field '{field}' not found in '{key}'")]
    FieldNotFound { key: String, field: String },

    #[error("tokens not found")]
    Empty,
}

/// Output transform errors.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("transformer does not support {0} files")]
    Unsupported(String),

    #[error("unknown output {0}")]
    UnknownKind(String),

    #[error("json error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Output(OutputError::Json(e.to_string()))
    }
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Prompt(e.to_string())
    }
}

impl Error {
    /// Attach a path to an I/O failure.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::File {
            path: path.into(),
            source,
        }
    }

    /// Build a remote failure for the named service.
    pub fn remote(service: &str, message: impl std::fmt::Display) -> Self {
        Error::Service(ServiceError::Remote {
            service: service.to_string(),
            message: message.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
