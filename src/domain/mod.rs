//! Domain module
//!
//! Venue aggregate, its value objects and their validation rules.

pub mod address;
pub mod cuisine;
pub mod error;
pub mod rating;
pub mod validation;
pub mod venue;

pub use address::Address;
pub use cuisine::{CuisineKind, UnknownCuisineKind};
pub use error::DomainError;
pub use rating::Rating;
pub use validation::{FieldError, Validate, ValidationResult};
pub use venue::Venue;
