//! Storage schema
//!
//! Document shapes of the `venues` and `ratings` collections and their
//! conversion to and from the domain types.

mod rating;
mod venue;

pub use rating::RatingRecord;
pub use venue::{AddressRecord, VenueRecord};

use crate::store::Document;

/// Errors converting between documents and domain objects
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// Venue has no address to store
    #[error("Venue has no address attached")]
    MissingAddress,

    /// Replacing requires the identifier assigned on insert
    #[error("Venue has no identifier")]
    MissingId,

    /// Stored document does not have the expected shape
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode a stored document into a record.
pub fn from_document<T: serde::de::DeserializeOwned>(document: Document) -> Result<T, MapperError> {
    Ok(serde_json::from_value(document)?)
}

/// Encode a record as a document.
pub fn to_document<T: serde::Serialize>(record: &T) -> Result<Document, MapperError> {
    Ok(serde_json::to_value(record)?)
}
