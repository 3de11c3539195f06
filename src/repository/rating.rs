//! Rating Repository

use std::sync::Arc;

use crate::domain::Rating;
use crate::schema::{from_document, to_document, RatingRecord};
use crate::store::{DocumentStore, Filter, RATINGS};

use super::RepositoryError;

/// Field keying a rating back to its venue
pub const VENUE_ID_FIELD: &str = "venue_id";

/// Repository for the rating collection
#[derive(Clone)]
pub struct RatingRepository {
    store: Arc<dyn DocumentStore>,
}

impl RatingRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append a rating for a venue. Duplicates are allowed.
    pub async fn insert(&self, venue_id: &str, rating: &Rating) -> Result<String, RepositoryError> {
        let document = to_document(&RatingRecord::new(venue_id, rating))?;
        let id = self.store.insert(RATINGS, document).await?;

        tracing::info!(venue_id, rating_id = %id, stars = rating.stars(), "Rating inserted");
        Ok(id)
    }

    pub async fn delete_all_for_venue(&self, venue_id: &str) -> Result<u64, RepositoryError> {
        Ok(self
            .store
            .delete_many(RATINGS, &Filter::eq(VENUE_ID_FIELD, venue_id))
            .await?)
    }

    /// Ratings of a venue in store order
    pub async fn find_for_venue(&self, venue_id: &str) -> Result<Vec<Rating>, RepositoryError> {
        let documents = self
            .store
            .find(RATINGS, &Filter::eq(VENUE_ID_FIELD, venue_id))
            .await?;

        documents
            .into_iter()
            .map(|doc| -> Result<Rating, RepositoryError> {
                Ok(from_document::<RatingRecord>(doc)?.into_domain())
            })
            .collect()
    }
}
