//! Batch results.

use crate::error::{Error, Result};

/// Outcome of an operation over many subjects.
///
/// One subject failing never stops the batch; failures are collected with
/// the subject they belong to.
#[derive(Debug)]
pub struct Report<T> {
    pub items: Vec<T>,
    pub failures: Vec<(String, Error)>,
    pub warnings: Vec<String>,
}

impl<T> Default for Report<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> Report<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn fail(&mut self, subject: impl Into<String>, error: Error) {
        self.failures.push((subject.into(), error));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Subjects attempted.
    pub fn total(&self) -> usize {
        self.items.len() + self.failures.len()
    }

    /// Collapse into the items, or [`Error::Batch`] when anything failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Batch`] if the report holds failures.
    pub fn into_result(self, action: &'static str) -> Result<Vec<T>> {
        if self.failures.is_empty() {
            return Ok(self.items);
        }
        Err(Error::Batch {
            action,
            failed: self.failures.len(),
            total: self.total(),
        })
    }
}
