//! Value classification helpers shared by services and transforms.

use serde_json::Value;

use crate::core::constants::file_type;
use crate::core::dotenv;

/// Whether a value must be quoted when written as an env line.
///
/// Numbers and booleans are written bare.
pub fn is_string(value: &str) -> bool {
    let numeric = !value.is_empty() && value.chars().all(|c| c.is_ascii_digit() || c == '.');
    if numeric {
        return false;
    }
    !matches!(value.to_lowercase().as_str(), "true" | "false")
}

/// Typed JSON value for an env string: booleans, then integers, else string.
pub fn typed(value: &str) -> Value {
    match value {
        "true" | "TRUE" | "True" => return Value::Bool(true),
        "false" | "FALSE" | "False" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = value.parse::<i64>() {
        return Value::from(n);
    }

    Value::String(value.to_string())
}

/// Whether the payload can be split into keys.
///
/// Env files always can; JSON can unless it is a top-level array.
pub fn supports_parsing(kind: &str, data: &[u8]) -> bool {
    match kind {
        file_type::ENV => true,
        file_type::JSON => {
            let first = data.iter().find(|b| !b.is_ascii_whitespace());
            first != Some(&b'[')
        }
        _ => false,
    }
}

/// Render a JSON scalar for an env line: strings quoted, others bare.
pub fn env_line(name: &str, value: &Value) -> String {
    match value {
        Value::String(s) => format!("{}=\"{}\"", name, dotenv::escape(s)),
        other => format!("{}={}", name, other),
    }
}
