//! Validation result
//!
//! Field-level errors accumulated by the entity validators. Nested objects
//! produce their own result which the parent merges into its own.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Outcome of validating one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed rule for `field`
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Append every error of a nested result, keeping their order.
    pub fn merge(&mut self, nested: ValidationResult) {
        self.errors.extend(nested.errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Rule set of an entity.
pub trait Validate {
    /// Run every rule and collect the failures.
    ///
    /// # Errors
    /// Only when a precondition of the entity itself is broken (for example a
    /// venue validated before its address was attached). Rule failures are
    /// reported inside the returned result.
    fn validate(&self) -> Result<ValidationResult, DomainError>;
}

/// Length in UTF-16 code units, so a character outside the BMP counts twice.
pub(crate) fn char_len(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Empty or whitespace only
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `NotEmpty` + `MaximumLength(max)`
pub(crate) fn require_max_len(
    result: &mut ValidationResult,
    field: &str,
    label: &str,
    value: &str,
    max: usize,
) {
    if is_blank(value) {
        result.add_error(field, format!("{label} must not be empty."));
    }
    if char_len(value) > max {
        result.add_error(field, format!("{label} must have at most {max} characters."));
    }
}

/// `NotEmpty` + `Length(exact)`
pub(crate) fn require_exact_len(
    result: &mut ValidationResult,
    field: &str,
    label: &str,
    value: &str,
    exact: usize,
) {
    if is_blank(value) {
        result.add_error(field, format!("{label} must not be empty."));
    }
    if char_len(value) != exact {
        result.add_error(field, format!("{label} must have exactly {exact} characters."));
    }
}
