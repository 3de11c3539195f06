//! Venue Handler
//!
//! Validated writes against the catalog and the rating/venue deletion cascade.

use std::sync::Arc;

use crate::domain::{CuisineKind, Rating, Validate, Venue};
use crate::error::AppError;
use crate::repository::{RatingRepository, VenueRepository};
use crate::store::DocumentStore;

use super::{
    RateVenueCommand, RateVenueResult, RegisterVenueCommand, RegisterVenueResult, RemovalCounts,
    ReplaceVenueCommand, UpdateVenueResult,
};

/// Handler for venue and rating writes
#[derive(Clone)]
pub struct VenueHandler {
    venues: VenueRepository,
    ratings: RatingRepository,
}

impl VenueHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            venues: VenueRepository::new(store.clone()),
            ratings: RatingRepository::new(store),
        }
    }

    /// Validate and store a new venue
    pub async fn register_venue(
        &self,
        command: RegisterVenueCommand,
    ) -> Result<RegisterVenueResult, AppError> {
        let mut venue = Venue::new(command.name, command.cuisine);
        if let Some(address) = command.address {
            venue.attach_address(address);
        }

        ensure_valid(&venue)?;

        let venue_id = self.venues.insert(&venue).await?;
        Ok(RegisterVenueResult { venue_id })
    }

    /// Validate and overwrite an existing venue
    pub async fn replace_venue(
        &self,
        command: ReplaceVenueCommand,
    ) -> Result<UpdateVenueResult, AppError> {
        let mut venue = Venue::with_id(command.venue_id.clone(), command.name, command.cuisine);
        if let Some(address) = command.address {
            venue.attach_address(address);
        }

        ensure_valid(&venue)?;
        self.ensure_exists(&command.venue_id).await?;

        let modified = self.venues.replace_whole(&venue).await?;
        Ok(UpdateVenueResult {
            venue_id: command.venue_id,
            modified,
        })
    }

    /// Change the cuisine kind of an existing venue
    pub async fn change_cuisine(
        &self,
        venue_id: &str,
        cuisine: CuisineKind,
    ) -> Result<UpdateVenueResult, AppError> {
        self.ensure_exists(venue_id).await?;

        let modified = self.venues.update_cuisine_kind(venue_id, cuisine).await?;
        Ok(UpdateVenueResult {
            venue_id: venue_id.to_string(),
            modified,
        })
    }

    /// Validate a rating and attach it to an existing venue
    pub async fn rate_venue(&self, command: RateVenueCommand) -> Result<RateVenueResult, AppError> {
        let rating = Rating::new(command.stars, command.comment);

        ensure_valid(&rating)?;
        self.ensure_exists(&command.venue_id).await?;

        let rating_id = self.ratings.insert(&command.venue_id, &rating).await?;

        tracing::info!(
            venue_id = %command.venue_id,
            rating_id = %rating_id,
            stars = rating.stars(),
            "Venue rated"
        );

        Ok(RateVenueResult {
            rating_id,
            venue_id: command.venue_id,
        })
    }

    /// Delete a venue's ratings, then the venue itself.
    ///
    /// The two deletes are independent: if the second one fails the ratings
    /// stay deleted.
    pub async fn remove_venue(&self, venue_id: &str) -> Result<RemovalCounts, AppError> {
        let ratings_deleted = self.ratings.delete_all_for_venue(venue_id).await?;
        let venues_deleted = self.venues.delete(venue_id).await?;

        tracing::info!(venue_id, venues_deleted, ratings_deleted, "Venue removed");

        Ok(RemovalCounts {
            venues_deleted,
            ratings_deleted,
        })
    }

    async fn ensure_exists(&self, venue_id: &str) -> Result<(), AppError> {
        match self.venues.get_by_id(venue_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::VenueNotFound(venue_id.to_string())),
        }
    }
}

fn ensure_valid<T: Validate>(value: &T) -> Result<(), AppError> {
    let result = value.validate()?;
    if result.is_valid() {
        Ok(())
    } else {
        Err(AppError::Validation(result.into_errors()))
    }
}
