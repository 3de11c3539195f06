//! Document store errors

/// Errors that can occur in a document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the statement
    #[error("Store connectivity error: {0}")]
    Connectivity(#[from] sqlx::Error),

    /// Document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Document is not a JSON object or misses a required field
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Filter, update or pipeline the store cannot execute
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Collection has no backing table
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// Insert with an `_id` that is already taken
    #[error("Duplicate document id: {0}")]
    DuplicateKey(String),
}

impl StoreError {
    /// Check if the error came from the store being unavailable
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StoreError::Connectivity(_))
    }
}
