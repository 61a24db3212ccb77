//! Inject operation.
//!
//! Replaces `${key}` and `${key::field}` tokens in text with values read
//! straight from a service. Works without a catalog.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::Stash;
use crate::core::constants::file_type;
use crate::core::dotenv;
use crate::core::output::{self, OutputKind};
use crate::core::path;
use crate::core::report::Report;
use crate::core::service::Unit;
use crate::core::token::{self, Reference};
use crate::error::{Error, Result, TokenError};

/// Label used for piped input.
pub const STDIN: &str = "stdin";

/// Inputs for [`Stash::inject`].
#[derive(Debug, Clone, Default)]
pub struct InjectOptions {
    /// Piped text, processed before any file.
    pub stdin: Option<String>,
    pub files: Vec<String>,
    pub service: String,
    pub output: OutputKind,
}

/// One source with its tokens replaced.
#[derive(Debug, Clone)]
pub struct Injected {
    pub source: String,
    pub output: OutputKind,
    pub data: Vec<u8>,
    pub tokens: usize,
}

impl Stash {
    /// Resolve tokens in piped text and files.
    ///
    /// A token that cannot be resolved is reported and left in place.
    ///
    /// # Errors
    ///
    /// Returns error if the service is unknown or fails to initialize.
    pub fn inject(&mut self, options: InjectOptions) -> Result<Report<Injected>> {
        self.prepare(&options.service)?;

        let mut report = Report::new();
        let mut sources: Vec<(String, String)> = Vec::new();

        if let Some(text) = options.stdin.filter(|t| !t.is_empty()) {
            sources.push((STDIN.to_string(), text));
        }
        for file in &options.files {
            match std::fs::read_to_string(file) {
                Ok(text) => sources.push((file.clone(), text)),
                Err(e) => report.fail(file.clone(), Error::file(file, e)),
            }
        }

        for (source, text) in sources {
            let tokens = token::find(&text)?;
            if tokens.is_empty() {
                warn!(source = %source, "no tokens");
                report.warn(format!("{}: {}", source, TokenError::Empty));
            }

            let mut values = BTreeMap::new();
            for (placeholder, reference) in &tokens {
                match self.resolve_token(&options.service, reference, options.output) {
                    Ok(value) => {
                        values.insert(placeholder.clone(), value);
                    }
                    Err(err) => report.fail(format!("{} {}", source, placeholder), err),
                }
            }

            let replaced = token::replace(&text, &values)?;
            let kind = if source == STDIN {
                String::new()
            } else {
                path::file_type(&source)
            };

            match output::select(options.output, &kind).transform(replaced.as_bytes()) {
                Ok(data) => {
                    debug!(source = %source, tokens = values.len(), "injected");
                    report.push(Injected {
                        source,
                        output: options.output,
                        data,
                        tokens: values.len(),
                    });
                }
                Err(err) => report.fail(source, err),
            }
        }

        Ok(report)
    }

    fn resolve_token(
        &mut self,
        service_key: &str,
        reference: &Reference,
        output: OutputKind,
    ) -> Result<String> {
        let kind = if reference.field.is_some() {
            file_type::ENV
        } else {
            file_type::NONE
        };

        let service = self.registry.get_mut(service_key)?;
        let result = service.download(Unit::for_reference(&reference.key, kind), output)?;

        match &reference.field {
            None => Ok(result.text()?.to_string()),
            Some(field) => {
                let pairs = dotenv::parse_bytes(&result.data)?;
                pairs.get(field).cloned().ok_or_else(|| {
                    TokenError::FieldNotFound {
                        key: reference.key.clone(),
                        field: field.clone(),
                    }
                    .into()
                })
            }
        }
    }
}
