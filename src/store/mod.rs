//! Document Store module
//!
//! The document-store capability the repositories are written against, with
//! an in-process backend and a PostgreSQL backend that keeps each collection
//! as a table of JSONB documents.

mod error;
mod memory;
mod postgres;
mod query;

use async_trait::async_trait;

pub use error::StoreError;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use query::{Document, FieldUpdate, Filter, Stage, ID_FIELD};

/// Collection holding venue documents
pub const VENUES: &str = "venues";

/// Collection holding rating documents, keyed back to venues by `venue_id`
pub const RATINGS: &str = "ratings";

/// Collections a backend must provide
pub const COLLECTIONS: [&str; 2] = [VENUES, RATINGS];

/// Fields covered by a collection's text index
pub fn text_index_fields(collection: &str) -> &'static [&'static str] {
    match collection {
        VENUES => &["name"],
        _ => &[],
    }
}

/// Operations of a document-oriented store.
///
/// Counts follow document-store semantics: a replace or update that leaves
/// the matched document unchanged reports zero modified documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its identifier. An `_id` is generated
    /// when the document has none.
    async fn insert(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Replace the first matching document, keeping its `_id`.
    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<u64, StoreError>;

    /// Set one field on the first matching document.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &FieldUpdate,
    ) -> Result<u64, StoreError>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Matching documents in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Run a pipeline over the collection and return its output documents.
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Stage],
    ) -> Result<Vec<Document>, StoreError>;

    /// Documents whose indexed text matches any term of `query`, best match first.
    async fn text_search(&self, collection: &str, query: &str)
        -> Result<Vec<Document>, StoreError>;
}
