//! JSON object transform.

use serde_json::{Map, Value};

use super::{to_pretty_json, Transformer};
use crate::core::constants::file_type;
use crate::core::dotenv;
use crate::core::service::value::typed;
use crate::error::{OutputError, Result};

/// Env files become a typed JSON object; JSON passes through unchanged.
pub struct Json {
    file_type: String,
}

impl Json {
    pub fn new(file_type: &str) -> Self {
        Self {
            file_type: file_type.to_string(),
        }
    }
}

impl Transformer for Json {
    fn transform(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.file_type.as_str() {
            file_type::JSON => Ok(data.to_vec()),
            file_type::ENV => {
                let pairs = dotenv::parse_bytes(data)?;
                let object: Map<String, Value> =
                    pairs.iter().map(|(k, v)| (k.clone(), typed(v))).collect();
                to_pretty_json(&object)
            }
            other => Err(OutputError::Unsupported(other.to_string()).into()),
        }
    }
}
