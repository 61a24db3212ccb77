//! Hierarchical parameter storage.
//!
//! Each env key becomes one encrypted parameter at `{remote_key}/{NAME}`.
//! Keys already tracked keep their stored location, so a parameter moved by
//! hand is still found on the next sync.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{debug, info};

use super::{non_default, Changes, Io, OptionSpec, RemoteSecret, SecretSet, Service, TreeClient, Unit};
use crate::core::constants::{file_type, option};
use crate::core::dotenv::{self, Pairs};
use crate::core::output::{to_pretty_json, OutputKind};
use crate::core::path;
use crate::core::service::value::is_string;
use crate::core::types::SecurityRating;
use crate::error::{Result, ServiceError};

const KEY: &str = "parameter-store";
const DEFAULT_KMS_KEY: &str = "aws/ssm";
const KIND: &str = "SecureString";

/// Stores env files as one parameter per key.
pub struct Tree<C: TreeClient> {
    client: C,
    io: Io,
}

impl<C: TreeClient> Tree<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            io: Io::unattended(),
        }
    }

    /// Remote parameters a unit tracks.
    ///
    /// A direct reference (no catalog key) also matches every parameter
    /// below its remote key, so a whole env tree can be addressed by path.
    fn fetch(&mut self, unit: &Unit, with_history: bool) -> Result<SecretSet> {
        let everything_below = unit.catalog_key.is_empty();
        let mut found = SecretSet::new();

        for (dir, names) in key_paths(unit) {
            let below = everything_below && dir == unit.remote_key;
            for param in self.client.get_by_path(&dir)? {
                let tracked = path::dir(&param.name) == dir
                    && names.iter().any(|n| n == path::base(&param.name));
                if !tracked && !below {
                    continue;
                }

                let key_id = if with_history {
                    self.key_id(&param.name)?
                } else {
                    DEFAULT_KMS_KEY.to_string()
                };
                found.insert(
                    param.name.clone(),
                    RemoteSecret {
                        name: param.name,
                        value: param.value,
                        key_id,
                        kind: param.kind,
                        last_modified: param.last_modified,
                        arn: param.arn,
                    },
                );
            }
        }

        debug!(remote_key = %unit.remote_key, found = found.len(), "fetched parameters");
        Ok(found)
    }

    /// Encryption key of the latest version, without the `alias/` prefix.
    fn key_id(&mut self, name: &str) -> Result<String> {
        let latest = self
            .client
            .history(name)?
            .into_iter()
            .max_by_key(|v| v.version);

        Ok(latest
            .and_then(|v| v.key_id)
            .map(|k| bare_key_id(&k).to_string())
            .unwrap_or_else(|| DEFAULT_KMS_KEY.to_string()))
    }
}

/// Key id as history reports it, without the `alias/` prefix.
fn bare_key_id(key_id: &str) -> &str {
    key_id.trim_start_matches("alias/")
}

/// Directories to list, each with the parameter names wanted from it.
fn key_paths(unit: &Unit) -> BTreeMap<String, Vec<String>> {
    let mut paths: BTreeMap<String, Vec<String>> = BTreeMap::new();
    paths.entry(unit.remote_key.clone()).or_default();
    for key in &unit.keys {
        paths
            .entry(path::dir(key).to_string())
            .or_default()
            .push(path::base(key).to_string());
    }
    paths
}

fn env_data(remote: &SecretSet) -> Vec<u8> {
    let by_name: BTreeMap<&str, &str> = remote
        .values()
        .map(|s| (path::base(&s.name), s.value.as_str()))
        .collect();

    let mut out = String::new();
    for (name, value) in by_name {
        if is_string(value) {
            out.push_str(&format!("{}=\"{}\"\n", name, dotenv::escape(value)));
        } else {
            out.push_str(&format!("{}={}\n", name, value));
        }
    }
    out.into_bytes()
}

impl<C: TreeClient> Service for Tree<C> {
    fn key(&self) -> &'static str {
        KEY
    }

    /// Leading `/`; characters outside `[a-zA-Z0-9]` and the `.` to `_`
    /// ASCII range become `-`.
    fn object_key(&self, key: &str) -> String {
        let cleaned = path::sanitize(
            key,
            |c| c.is_ascii_alphanumeric() || ('.'..='_').contains(&c),
            '-',
        );
        format!("/{}", cleaned.trim_start_matches('/'))
    }

    fn compatible(&self, file_types: &[&str]) -> bool {
        file_types.iter().all(|t| *t == file_type::ENV)
    }

    fn security_rating(&self) -> SecurityRating {
        SecurityRating::Medium
    }

    fn initialize(&mut self, io: Io) -> Result<()> {
        self.io = io;
        Ok(())
    }

    fn sync(&mut self, mut unit: Unit) -> Result<Unit> {
        let key_id = unit.ensure_option(
            OptionSpec::text(option::KMS_KEY_ID)
                .with_default(DEFAULT_KMS_KEY)
                .with_help(option::KMS_KEY_HELP),
            &self.io,
        )?;

        let pairs = if unit.data.is_empty() {
            Pairs::new()
        } else {
            dotenv::parse(unit.text()?)?
        };

        let remote = self.fetch(&unit, true)?;
        let local: SecretSet = pairs
            .iter()
            .map(|(name, value)| {
                let remote_name = unit
                    .lookup_remote_key(name)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}/{}", unit.remote_key, name));
                let secret = RemoteSecret::local(
                    remote_name.clone(),
                    value.as_str(),
                    bare_key_id(&key_id),
                    KIND,
                );
                (remote_name, secret)
            })
            .collect();

        let changes = Changes::compute(&local, &remote, unit.synced);
        changes.confirm(&self.io)?;

        let write_key = non_default(&key_id, DEFAULT_KMS_KEY);
        for secret in changes.created.iter().chain(&changes.updated) {
            self.client.put_parameter(&secret.name, &secret.value, write_key)?;
        }
        for secret in &changes.deleted {
            self.client.delete_parameter(&secret.name)?;
        }

        info!(
            remote_key = %unit.remote_key,
            created = changes.created.len(),
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            "synced parameters"
        );

        unit.keys = local.into_keys().collect();
        Ok(unit)
    }

    fn download(&mut self, mut unit: Unit, output: OutputKind) -> Result<Unit> {
        let remote = self.fetch(&unit, false)?;
        if remote.is_empty() {
            return Err(ServiceError::NotFound(format!("parameters under {}", unit.remote_key)).into());
        }

        let data = match output {
            OutputKind::EcsTaskInjectJson => {
                let refs: Vec<_> = remote
                    .values()
                    .map(|s| json!({"name": path::base(&s.name), "valueFrom": s.arn}))
                    .collect();
                to_pretty_json(&refs)?
            }
            OutputKind::EcsTaskInjectEnv => remote
                .values()
                .map(|s| format!("{}={}\n", path::base(&s.name), s.arn))
                .collect::<String>()
                .into_bytes(),
            _ if unit.file_type != file_type::ENV && remote.len() == 1 => remote
                .into_values()
                .next()
                .map(|s| s.value.into_bytes())
                .unwrap_or_default(),
            _ => env_data(&remote),
        };

        unit.set_data(data);
        Ok(unit)
    }

    fn purge(&mut self, mut unit: Unit) -> Result<Unit> {
        if unit.keys.is_empty() {
            return Ok(unit);
        }

        let remote = self.fetch(&unit, false)?;
        for name in remote.keys() {
            self.client.delete_parameter(name)?;
        }
        info!(remote_key = %unit.remote_key, deleted = remote.len(), "purged parameters");

        unit.keys.clear();
        Ok(unit)
    }
}
