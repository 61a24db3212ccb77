//! Constants used throughout stash.
//!
//! Centralizes magic strings and configuration values.

/// Default catalog file name (stash.yml).
pub const CATALOG_FILE: &str = "stash.yml";

/// Banner written at the top of every saved catalog.
pub const CATALOG_BANNER: &str = "## Stash Catalog ##\n";

/// Per-user directory relative to HOME (~/.stash).
pub const HOME_DIR: &str = ".stash";

/// Sync state file inside the per-user directory.
pub const STATE_FILE: &str = "state.yml";

/// Directory holding the local store emulation.
pub const REMOTE_DIR: &str = "remote";

/// Overrides the per-user directory.
pub const HOME_ENV: &str = "STASH_HOME";

/// Prefix for option overrides (`STASH_S3_BUCKET`, `STASH_KMS_KEY_ID`, ...).
pub const ENV_PREFIX: &str = "STASH_";

/// Seconds added to every recorded sync instant.
///
/// Remote stores stamp writes slightly after the request returns.
pub const SYNC_SKEW_SECS: i64 = 10;

/// Description attached to secrets created by stash.
pub const SECRET_DESCRIPTION: &str = "Managed by Stash";

/// Confirmation shown when a remote key changed after the last sync.
pub const OVERWRITE_PROMPT: &str = "Remote data has changed since your last sync. Overwrite?";

/// Recognized local file types, by extension.
pub mod file_type {
    pub const ENV: &str = "env";
    pub const JSON: &str = "json";
    pub const XML: &str = "xml";
    pub const YML: &str = "yml";
    pub const YAML: &str = "yaml";
    pub const CERT: &str = "cert";
    pub const SQL: &str = "sql";
    pub const JS: &str = "js";
    pub const TS: &str = "ts";
    /// Files without an extension (keys, certificates, ...).
    pub const NONE: &str = "";
}

/// Option keys persisted in a catalog entry's `opt` map.
pub mod option {
    pub const S3_BUCKET: &str = "s3_bucket";
    pub const KMS_KEY_ID: &str = "kms_key_id";
    pub const SECRETS: &str = "secrets";
    pub const GROUP_DELIMITER: &str = "group_delimiter";

    pub const SECRETS_SINGLE: &str = "single";
    pub const SECRETS_MULTIPLE: &str = "multiple";

    /// Help text for KMS key prompts.
    pub const KMS_KEY_HELP: &str =
        "KMS key id or alias used to encrypt the data; keep the default to use the AWS managed key.";
}
