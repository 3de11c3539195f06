//! Repository module
//!
//! Venue and rating adapters over the document store.

mod rating;
mod venue;

pub use rating::{RatingRepository, VENUE_ID_FIELD};
pub use venue::VenueRepository;

use crate::schema::MapperError;
use crate::store::StoreError;

/// Repository error types
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}
