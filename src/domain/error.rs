//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Broken domain preconditions.
///
/// Rule failures are not errors; they are reported through
/// [`ValidationResult`](super::ValidationResult).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A venue was validated before an address was attached
    #[error("Venue has no address attached")]
    MissingAddress,
}
