//! Output transforms.
//!
//! Reshape downloaded bytes into the representation the caller asked for.
//! Transforms are pure and stateless; asking one for a file type it does not
//! handle is an error, never a panic.

mod export;
mod json;
mod taskdef;

pub use export::Export;
pub use json::Json;
pub use taskdef::TaskDefEnv;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{OutputError, Result};

/// Requested output representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputKind {
    /// Bytes as stored.
    #[default]
    Original,
    /// Bytes as stored, written back to the tracked path.
    File,
    /// JSON object.
    Json,
    /// `export K="v"` lines.
    TerminalExport,
    /// `export K='v'` lines.
    TerminalExportLiteral,
    /// Task definition `environment` entries.
    EcsTaskEnv,
    /// Task definition `secrets` entries (ARN references).
    EcsTaskInjectJson,
    /// `NAME=arn` lines.
    EcsTaskInjectEnv,
}

impl OutputKind {
    /// Every kind, in display order.
    pub const ALL: [OutputKind; 8] = [
        OutputKind::Original,
        OutputKind::File,
        OutputKind::Json,
        OutputKind::TerminalExport,
        OutputKind::TerminalExportLiteral,
        OutputKind::EcsTaskEnv,
        OutputKind::EcsTaskInjectJson,
        OutputKind::EcsTaskInjectEnv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Original => "original",
            OutputKind::File => "file",
            OutputKind::Json => "json",
            OutputKind::TerminalExport => "terminal-export",
            OutputKind::TerminalExportLiteral => "terminal-export-literal",
            OutputKind::EcsTaskEnv => "ecs-task-env",
            OutputKind::EcsTaskInjectJson => "ecs-task-inject-json",
            OutputKind::EcsTaskInjectEnv => "ecs-task-inject-env",
        }
    }

    /// Parser usable as a clap `value_parser`.
    pub fn parse(value: &str) -> std::result::Result<Self, String> {
        value.parse().map_err(|e: OutputError| e.to_string())
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = OutputError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        OutputKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| OutputError::UnknownKind(s.to_string()))
    }
}

/// A pure bytes-to-bytes reshaping.
pub trait Transformer {
    /// # Errors
    ///
    /// Returns error if the input type is unsupported or malformed.
    fn transform(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Returns its input unchanged.
pub struct Passthrough;

impl Transformer for Passthrough {
    fn transform(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Pick the transform for an output kind and input file type.
///
/// Kinds produced by a service download (task-inject forms) and the raw kinds
/// pass through.
pub fn select(kind: OutputKind, file_type: &str) -> Box<dyn Transformer> {
    match kind {
        OutputKind::Json => Box::new(Json::new(file_type)),
        OutputKind::TerminalExport => Box::new(Export::new(file_type, false)),
        OutputKind::TerminalExportLiteral => Box::new(Export::new(file_type, true)),
        OutputKind::EcsTaskEnv => Box::new(TaskDefEnv::new(file_type)),
        OutputKind::Original
        | OutputKind::File
        | OutputKind::EcsTaskInjectJson
        | OutputKind::EcsTaskInjectEnv => Box::new(Passthrough),
    }
}

/// Serialize with four-space indentation.
///
/// # Errors
///
/// Returns error if the value cannot be serialized.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}
