//! Discrete secret storage.
//!
//! In `single` mode a file is one secret: env files become a JSON object of
//! strings, everything else is stored verbatim. In `multiple` mode env keys
//! are grouped by a delimiter (`DB_USER` and `DB_PASS` with `_` form the
//! `DB` secret) and top-level JSON keys become one secret each.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::{
    non_default, Changes, Io, OptionSpec, RemoteSecret, SecretClient, SecretLookup, SecretSet,
    Service, Unit,
};
use crate::core::constants::{file_type, option, SECRET_DESCRIPTION};
use crate::core::dotenv;
use crate::core::output::{to_pretty_json, OutputKind};
use crate::core::path;
use crate::core::service::value::{env_line, typed};
use crate::core::types::SecurityRating;
use crate::error::{Result, ServiceError};

const KEY: &str = "secrets-manager";
const DEFAULT_KMS_KEY: &str = "aws/secretsmanager";

const COMPATIBLE: [&str; 10] = [
    file_type::ENV,
    file_type::JSON,
    file_type::JS,
    file_type::TS,
    file_type::XML,
    file_type::CERT,
    file_type::SQL,
    file_type::YML,
    file_type::YAML,
    file_type::NONE,
];

const MODES: [&str; 2] = [option::SECRETS_SINGLE, option::SECRETS_MULTIPLE];

/// Stores files as one or more named secrets.
pub struct Secrets<C: SecretClient> {
    client: C,
    io: Io,
}

impl<C: SecretClient> Secrets<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            io: Io::unattended(),
        }
    }

    /// Live secrets among `names`, plus the names that are soft-deleted.
    fn fetch<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a String>,
    ) -> Result<(SecretSet, BTreeSet<String>)> {
        let mut live = SecretSet::new();
        let mut deleted = BTreeSet::new();

        for name in names {
            match self.client.lookup(name)? {
                SecretLookup::Found(secret) => {
                    live.insert(
                        name.clone(),
                        RemoteSecret {
                            name: name.clone(),
                            value: secret.value,
                            key_id: secret.key_id.unwrap_or_else(|| DEFAULT_KMS_KEY.to_string()),
                            kind: String::new(),
                            last_modified: secret.last_changed,
                            arn: secret.arn,
                        },
                    );
                }
                SecretLookup::Deleted => {
                    deleted.insert(name.clone());
                }
                SecretLookup::Missing => {}
            }
        }
        Ok((live, deleted))
    }
}

fn mode(unit: &Unit) -> &str {
    unit.option_or(option::SECRETS, option::SECRETS_SINGLE)
}

fn delimiter(unit: &Unit) -> String {
    unit.options
        .get(option::GROUP_DELIMITER)
        .cloned()
        .or_else(|| std::env::var(super::env_key(option::GROUP_DELIMITER)).ok())
        .unwrap_or_default()
}

/// Tracked key whose last segment is `suffix`, else `{remote_key}/{suffix}`.
fn group_key(unit: &Unit, suffix: &str) -> String {
    unit.lookup_remote_key(suffix)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/{}", unit.remote_key, suffix))
}

/// Key for a whole-file secret: the single tracked key, else the default.
fn whole_key(unit: &Unit) -> String {
    match unit.keys.as_slice() {
        [only] => only.clone(),
        _ => unit.remote_key.clone(),
    }
}

/// Split the unit's payload into secret name and value.
fn to_map(unit: &Unit) -> Result<BTreeMap<String, String>> {
    let multiple = mode(unit) == option::SECRETS_MULTIPLE;

    match unit.file_type.as_str() {
        file_type::ENV => {
            let pairs = dotenv::parse(unit.text()?)?;
            if multiple {
                env_to_map(unit, &pairs)
            } else {
                let mut map = BTreeMap::new();
                map.insert(unit.remote_key.clone(), serde_json::to_string(&pairs)?);
                Ok(map)
            }
        }
        file_type::JSON if multiple => json_to_map(unit),
        _ => {
            let mut map = BTreeMap::new();
            map.insert(whole_key(unit), unit.text()?.to_string());
            Ok(map)
        }
    }
}

fn env_to_map(unit: &Unit, pairs: &dotenv::Pairs) -> Result<BTreeMap<String, String>> {
    let delim = delimiter(unit);
    let mut groups: BTreeMap<String, Map<String, Value>> = BTreeMap::new();

    for (key, value) in pairs {
        let (suffix, prop) = match key.split_once(delim.as_str()) {
            Some((group, rest)) if !delim.is_empty() && !group.is_empty() && !rest.is_empty() => {
                (group.to_string(), rest.to_string())
            }
            _ => (key.clone(), key.clone()),
        };
        groups.entry(suffix).or_default().insert(prop, typed(value));
    }

    groups
        .into_iter()
        .map(|(suffix, props)| -> Result<(String, String)> {
            Ok((group_key(unit, &suffix), serde_json::to_string(&props)?))
        })
        .collect()
}

fn json_to_map(unit: &Unit) -> Result<BTreeMap<String, String>> {
    let object: Map<String, Value> = serde_json::from_slice(&unit.data)
        .map_err(|e| ServiceError::InvalidFile(format!("{}: {}", unit.local_path, e)))?;

    object
        .into_iter()
        .map(|(key, value)| -> Result<(String, String)> {
            let flat = matches!(&value, Value::Object(m) if m.values().all(Value::is_string));
            let stored = if flat {
                serde_json::to_string(&value)?
            } else {
                let mut wrapped = Map::new();
                wrapped.insert(key.clone(), value);
                serde_json::to_string(&wrapped)?
            };
            Ok((group_key(unit, &key), stored))
        })
        .collect()
}

/// Join downloaded secrets back into env lines.
///
/// With a delimiter, a property is prefixed with its group unless the group
/// name already equals the property.
fn env_to_data(values: &BTreeMap<String, String>, delim: &str) -> Result<Vec<u8>> {
    let mut lines = BTreeMap::new();
    for (name, value) in values {
        let object: Map<String, Value> = serde_json::from_str(value)
            .map_err(|e| ServiceError::InvalidFile(format!("{}: {}", name, e)))?;
        let group = path::base(name).to_uppercase();

        for (prop, v) in object {
            let key = if !delim.is_empty() && group != prop {
                format!("{}{}{}", group, delim, prop)
                    .trim_matches(|c: char| delim.contains(c))
                    .to_string()
            } else {
                prop
            };
            lines.insert(key.clone(), env_line(&key, &v));
        }
    }

    let mut out = lines.into_values().collect::<Vec<_>>().join("\n");
    out.push('\n');
    Ok(out.into_bytes())
}

/// Merge downloaded secrets back into one JSON document.
fn json_to_data(values: &BTreeMap<String, String>, multiple: bool) -> Result<Vec<u8>> {
    if !multiple {
        let first = values.values().next().map(String::as_str).unwrap_or("{}");
        let value: Value = serde_json::from_str(first)?;
        return to_pretty_json(&value);
    }

    let mut merged = Map::new();
    for (name, value) in values {
        let suffix = path::base(name).to_string();
        let Ok(Value::Object(object)) = serde_json::from_str::<Value>(value) else {
            continue;
        };

        for (prop, v) in object {
            if prop == suffix {
                merged.insert(suffix.clone(), v);
                continue;
            }
            match merged.get_mut(&suffix) {
                Some(Value::Object(group)) => {
                    group.insert(prop, v);
                }
                _ => {
                    let mut group = Map::new();
                    group.insert(prop, v);
                    merged.insert(suffix.clone(), Value::Object(group));
                }
            }
        }
    }
    to_pretty_json(&merged)
}

impl<C: SecretClient> Service for Secrets<C> {
    fn key(&self) -> &'static str {
        KEY
    }

    /// Characters outside `[a-zA-Z0-9/_+=.@-]` become `-`.
    fn object_key(&self, key: &str) -> String {
        path::sanitize(key, |c| c.is_ascii_alphanumeric() || "/_+=.@-".contains(c), '-')
    }

    fn compatible(&self, file_types: &[&str]) -> bool {
        file_types.iter().all(|t| COMPATIBLE.contains(t))
    }

    fn security_rating(&self) -> SecurityRating {
        SecurityRating::High
    }

    fn initialize(&mut self, io: Io) -> Result<()> {
        self.io = io;
        Ok(())
    }

    fn sync(&mut self, mut unit: Unit) -> Result<Unit> {
        if unit.supports_parsing() {
            unit.ensure_option(
                OptionSpec::text(option::SECRETS)
                    .with_default(option::SECRETS_SINGLE)
                    .with_help("Store the file as one secret, or split it into several")
                    .with_items(&MODES),
                &self.io,
            )?;
        }
        let key_id = unit.ensure_option(
            OptionSpec::text(option::KMS_KEY_ID)
                .with_default(DEFAULT_KMS_KEY)
                .with_help(option::KMS_KEY_HELP),
            &self.io,
        )?;

        let values = if unit.data.is_empty() {
            BTreeMap::new()
        } else {
            to_map(&unit)?
        };
        let local: SecretSet = values
            .into_iter()
            .map(|(name, value)| {
                let secret = RemoteSecret::local(name.clone(), value, &key_id, "");
                (name, secret)
            })
            .collect();

        let wanted: BTreeSet<String> = local.keys().chain(unit.keys.iter()).cloned().collect();
        let (remote, deleted) = self.fetch(&wanted)?;

        let changes = Changes::compute(&local, &remote, unit.synced);
        changes.confirm(&self.io)?;

        let write_key = non_default(&key_id, DEFAULT_KMS_KEY);
        for secret in &changes.created {
            if deleted.contains(&secret.name) {
                self.client.restore(&secret.name)?;
                self.client.update(&secret.name, &secret.value, write_key)?;
                debug!(name = %secret.name, "restored secret");
            } else {
                self.client
                    .create(&secret.name, &secret.value, write_key, SECRET_DESCRIPTION)?;
            }
        }
        for secret in &changes.updated {
            self.client.update(&secret.name, &secret.value, write_key)?;
        }
        for secret in &changes.deleted {
            self.client.delete(&secret.name)?;
        }

        info!(
            remote_key = %unit.remote_key,
            created = changes.created.len(),
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            "synced secrets"
        );

        unit.keys = local.into_keys().collect();
        Ok(unit)
    }

    fn download(&mut self, mut unit: Unit, output: OutputKind) -> Result<Unit> {
        if unit.keys.is_empty() {
            return Err(ServiceError::NotFound(unit.remote_key.clone()).into());
        }

        let mut values = BTreeMap::new();
        let mut arns = BTreeMap::new();
        for name in unit.keys.clone() {
            match self.client.lookup(&name)? {
                SecretLookup::Found(secret) => {
                    arns.insert(name.clone(), secret.arn);
                    values.insert(name, secret.value);
                }
                SecretLookup::Deleted | SecretLookup::Missing => {
                    return Err(ServiceError::NotFound(name).into());
                }
            }
        }

        let multiple = mode(&unit) == option::SECRETS_MULTIPLE;
        let data = match output {
            OutputKind::EcsTaskInjectJson => {
                let refs: Vec<_> = arns
                    .iter()
                    .map(|(name, arn)| json!({"name": path::base(name), "valueFrom": arn}))
                    .collect();
                to_pretty_json(&refs)?
            }
            OutputKind::EcsTaskInjectEnv => arns
                .iter()
                .map(|(name, arn)| format!("{}={}\n", path::base(name), arn))
                .collect::<String>()
                .into_bytes(),
            _ => match unit.file_type.as_str() {
                file_type::ENV if multiple => env_to_data(&values, &delimiter(&unit))?,
                file_type::ENV => env_to_data(&values, "")?,
                file_type::JSON => json_to_data(&values, multiple)?,
                _ => values.into_values().next().unwrap_or_default().into_bytes(),
            },
        };

        unit.set_data(data);
        Ok(unit)
    }

    fn purge(&mut self, mut unit: Unit) -> Result<Unit> {
        for name in std::mem::take(&mut unit.keys) {
            match self.client.lookup(&name)? {
                SecretLookup::Found(_) => {
                    self.client.delete(&name)?;
                    info!(name = %name, "deleted secret");
                }
                SecretLookup::Deleted | SecretLookup::Missing => {
                    debug!(name = %name, "secret already gone");
                }
            }
        }
        Ok(unit)
    }
}
