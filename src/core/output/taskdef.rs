//! Container task definition transform.

use serde::Serialize;

use super::{to_pretty_json, Transformer};
use crate::core::constants::file_type;
use crate::core::dotenv;
use crate::error::{OutputError, Result};

#[derive(Serialize)]
struct EnvVar<'a> {
    name: &'a str,
    value: &'a str,
}

/// Env files become `[{"name": .., "value": ..}]`.
pub struct TaskDefEnv {
    file_type: String,
}

impl TaskDefEnv {
    pub fn new(file_type: &str) -> Self {
        Self {
            file_type: file_type.to_string(),
        }
    }
}

impl Transformer for TaskDefEnv {
    fn transform(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.file_type != file_type::ENV {
            return Err(OutputError::Unsupported(self.file_type.clone()).into());
        }

        let pairs = dotenv::parse_bytes(data)?;
        let vars: Vec<EnvVar<'_>> = pairs
            .iter()
            .map(|(name, value)| EnvVar { name, value })
            .collect();
        to_pretty_json(&vars)
    }
}
