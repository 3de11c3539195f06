//! Venue Repository
//!
//! CRUD against the `venues` collection. Venues come back with their
//! address attached and no ratings.

use std::sync::Arc;

use crate::domain::{CuisineKind, Venue};
use crate::schema::{from_document, to_document, VenueRecord};
use crate::store::{Document, DocumentStore, FieldUpdate, Filter, VENUES};

use super::RepositoryError;

/// Repository for the venue collection
#[derive(Clone)]
pub struct VenueRepository {
    store: Arc<dyn DocumentStore>,
}

impl VenueRepository {
    /// Create a new VenueRepository over a store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a new venue and return the identifier assigned to it.
    pub async fn insert(&self, venue: &Venue) -> Result<String, RepositoryError> {
        let document = to_document(&VenueRecord::for_insert(venue)?)?;
        let id = self.store.insert(VENUES, document).await?;

        tracing::info!(venue_id = %id, name = venue.name(), "Venue inserted");
        Ok(id)
    }

    /// Every venue, in store order
    pub async fn get_all(&self) -> Result<Vec<Venue>, RepositoryError> {
        let documents = self.store.find(VENUES, &Filter::All).await?;
        to_venues(documents)
    }

    /// Point lookup. A missing venue is `Ok(None)`.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Venue>, RepositoryError> {
        let document = self.store.find(VENUES, &Filter::by_id(id)).await?.into_iter().next();

        match document {
            Some(document) => Ok(Some(from_document::<VenueRecord>(document)?.into_domain()?)),
            None => {
                tracing::debug!(venue_id = id, "Venue not found");
                Ok(None)
            }
        }
    }

    /// Venues whose name contains `text`, ignoring case
    pub async fn get_by_name_contains(&self, text: &str) -> Result<Vec<Venue>, RepositoryError> {
        let documents = self.store.find(VENUES, &Filter::contains("name", text)).await?;
        to_venues(documents)
    }

    /// Venues matched by the store's text index, best match first
    pub async fn full_text_search(&self, text: &str) -> Result<Vec<Venue>, RepositoryError> {
        let documents = self.store.text_search(VENUES, text).await?;
        to_venues(documents)
    }

    /// Replace the stored venue with this one.
    ///
    /// Returns `true` only if a document was modified; a missing venue and
    /// an identical replacement both return `false`.
    pub async fn replace_whole(&self, venue: &Venue) -> Result<bool, RepositoryError> {
        let record = VenueRecord::for_replace(venue)?;
        let filter = Filter::by_id(record.id.as_deref().unwrap_or_default());
        let modified = self
            .store
            .replace_one(VENUES, &filter, to_document(&record)?)
            .await?;

        tracing::debug!(venue_id = ?record.id, modified, "Venue replace");
        Ok(modified > 0)
    }

    /// Change only the cuisine kind. Same result semantics as [`Self::replace_whole`].
    pub async fn update_cuisine_kind(
        &self,
        id: &str,
        cuisine: CuisineKind,
    ) -> Result<bool, RepositoryError> {
        let update = FieldUpdate::set("cuisine", cuisine.code());
        let modified = self.store.update_one(VENUES, &Filter::by_id(id), &update).await?;

        tracing::debug!(venue_id = id, %cuisine, modified, "Venue cuisine update");
        Ok(modified > 0)
    }

    /// Delete the venue document only; its ratings are left untouched.
    pub async fn delete(&self, id: &str) -> Result<u64, RepositoryError> {
        Ok(self.store.delete_one(VENUES, &Filter::by_id(id)).await?)
    }
}

fn to_venues(documents: Vec<Document>) -> Result<Vec<Venue>, RepositoryError> {
    documents
        .into_iter()
        .map(|doc| -> Result<Venue, RepositoryError> {
            Ok(from_document::<VenueRecord>(doc)?.into_domain()?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;
    use crate::store::MemoryDocumentStore;

    fn repo() -> VenueRepository {
        VenueRepository::new(Arc::new(MemoryDocumentStore::new()))
    }

    fn venue(name: &str, cuisine: CuisineKind) -> Venue {
        let mut venue = Venue::new(name, cuisine);
        venue.attach_address(Address::new("Rua Augusta", "1500", "São Paulo", "SP", "01304001"));
        venue
    }

    #[tokio::test]
    async fn test_insert_and_get_by_id() {
        let repo = repo();
        let id = repo.insert(&venue("Cantina Roma", CuisineKind::Italian)).await.unwrap();

        let loaded = repo.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.id(), Some(id.as_str()));
        assert_eq!(loaded.name(), "Cantina Roma");
        assert!(loaded.address().is_some());

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_name_search_is_case_insensitive() {
        let repo = repo();
        repo.insert(&venue("Cantina Roma", CuisineKind::Italian)).await.unwrap();
        repo.insert(&venue("Sushi House", CuisineKind::Japanese)).await.unwrap();

        let found = repo.get_by_name_contains("ROMA").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "Cantina Roma");

        assert_eq!(repo.get_all().await.unwrap().len(), 2);
        assert!(repo.get_by_name_contains("taco").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_whole_semantics() {
        let repo = repo();
        let id = repo.insert(&venue("Cantina Roma", CuisineKind::Italian)).await.unwrap();

        let mut stored = repo.get_by_id(&id).await.unwrap().unwrap();
        assert!(!repo.replace_whole(&stored).await.unwrap(), "unchanged replace");

        let mut renamed = Venue::with_id(&id, "Cantina Napoli", stored.cuisine());
        renamed.attach_address(stored.address().cloned().unwrap());
        assert!(repo.replace_whole(&renamed).await.unwrap());
        stored = repo.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.name(), "Cantina Napoli");

        let mut ghost = Venue::with_id("ghost", "Ghost", CuisineKind::Arab);
        ghost.attach_address(stored.address().cloned().unwrap());
        assert!(!repo.replace_whole(&ghost).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_cuisine_kind() {
        let repo = repo();
        let id = repo.insert(&venue("Cantina Roma", CuisineKind::Italian)).await.unwrap();

        assert!(repo.update_cuisine_kind(&id, CuisineKind::Brazilian).await.unwrap());
        assert!(!repo.update_cuisine_kind(&id, CuisineKind::Brazilian).await.unwrap());
        assert!(!repo.update_cuisine_kind("missing", CuisineKind::Arab).await.unwrap());

        let loaded = repo.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.cuisine(), CuisineKind::Brazilian);
    }

    #[tokio::test]
    async fn test_delete_returns_count() {
        let repo = repo();
        let id = repo.insert(&venue("Cantina Roma", CuisineKind::Italian)).await.unwrap();

        assert_eq!(repo.delete(&id).await.unwrap(), 1);
        assert_eq!(repo.delete(&id).await.unwrap(), 0);
    }
}
