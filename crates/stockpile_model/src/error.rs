//! Validation errors for item construction.

use thiserror::Error;

/// An item failed validation at a boundary (form input, import, restore).
///
/// Carries every problem found so callers can report them all at once
/// instead of one per attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid item: {}", problems.join("; "))]
pub struct ValidationError {
    /// Human-readable descriptions of each failed check.
    pub problems: Vec<String>,
}

impl ValidationError {
    /// Creates a validation error from a list of problems.
    #[must_use]
    pub fn new(problems: Vec<String>) -> Self {
        Self { problems }
    }
}
