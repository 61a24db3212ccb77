//! Dotenv parsing.
//!
//! Parses `KEY=value` files into sorted pairs. Accepts an optional `export `
//! prefix, `KEY: value` lines, single or double quoted values, trailing
//! comments, and a leading byte order mark.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Parsed key/value pairs, sorted by key.
pub type Pairs = BTreeMap<String, String>;

const BOM: char = '\u{feff}';

/// Parse dotenv text.
///
/// Later duplicates win. Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns [`Error::Env`] for the first line that is not a valid assignment.
pub fn parse(data: &str) -> Result<Pairs> {
    let mut pairs = Pairs::new();

    for (i, raw) in data.lines().enumerate() {
        let line = if i == 0 {
            raw.trim_start_matches(BOM)
        } else {
            raw
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_line(trimmed) {
            Some((key, value)) => {
                pairs.insert(key, value);
            }
            None => {
                return Err(Error::Env {
                    line: i + 1,
                    content: raw.to_string(),
                })
            }
        }
    }

    Ok(pairs)
}

/// Parse raw bytes as dotenv text.
///
/// # Errors
///
/// Returns error if the bytes are not UTF-8 or a line is invalid.
pub fn parse_bytes(data: &[u8]) -> Result<Pairs> {
    let text = std::str::from_utf8(data).map_err(|e| Error::Env {
        line: 0,
        content: e.to_string(),
    })?;
    parse(text)
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = strip_export(line);

    let key_len = line
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    if key_len == 0 {
        return None;
    }

    let key = &line[..key_len];
    let rest = &line[key_len..];

    let value = if let Some(after) = rest.trim_start().strip_prefix('=') {
        after.trim_start()
    } else if let Some(after) = rest.strip_prefix(':') {
        if !after.starts_with(char::is_whitespace) {
            return None;
        }
        after.trim_start()
    } else {
        return None;
    };

    Some((key.to_string(), parse_value(value)))
}

fn strip_export(line: &str) -> &str {
    match line.strip_prefix("export") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => line,
    }
}

fn parse_value(value: &str) -> String {
    if let Some(inner) = value.strip_prefix('"') {
        if let Some(unescaped) = unescape_double(inner) {
            return unescaped;
        }
    }
    if let Some(inner) = value.strip_prefix('\'') {
        if let Some(end) = inner.rfind('\'') {
            return inner[..end].to_string();
        }
    }

    let unquoted = match value.find('#') {
        Some(i) => &value[..i],
        None => value,
    };
    unquoted.trim().to_string()
}

/// Body of a double quoted value up to its closing quote, unescaped.
///
/// `None` when the quote is never closed.
fn unescape_double(inner: &str) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => return Some(out),
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            _ => out.push(ch),
        }
    }
    None
}

/// Escape a value for a double quoted env line.
///
/// The inverse of what [`parse`] does inside double quotes.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
