//! Shell export transform.

use super::Transformer;
use crate::core::constants::file_type;
use crate::core::dotenv;
use crate::error::{OutputError, Result};

/// Env files become `export K="v"` lines, or `export K='v'` when literal.
pub struct Export {
    file_type: String,
    literal: bool,
}

impl Export {
    pub fn new(file_type: &str, literal: bool) -> Self {
        Self {
            file_type: file_type.to_string(),
            literal,
        }
    }
}

impl Transformer for Export {
    fn transform(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.file_type != file_type::ENV {
            return Err(OutputError::Unsupported(self.file_type.clone()).into());
        }

        let quote = if self.literal { '\'' } else { '"' };
        let pairs = dotenv::parse_bytes(data)?;

        let mut out = String::new();
        for (key, value) in &pairs {
            out.push_str(&format!("export {}={}{}{}\n", key, quote, value, quote));
        }
        Ok(out.into_bytes())
    }
}
