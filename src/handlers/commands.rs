//! Command definitions
//!
//! Commands represent intentions to change the catalog.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, CuisineKind};

/// Command to register a new venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVenueCommand {
    pub name: String,
    pub cuisine: CuisineKind,
    pub address: Option<Address>,
}

impl RegisterVenueCommand {
    pub fn new(name: String, cuisine: CuisineKind) -> Self {
        Self {
            name,
            cuisine,
            address: None,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}

/// Command to overwrite every field of a stored venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceVenueCommand {
    pub venue_id: String,
    pub name: String,
    pub cuisine: CuisineKind,
    pub address: Option<Address>,
}

impl ReplaceVenueCommand {
    pub fn new(venue_id: String, name: String, cuisine: CuisineKind) -> Self {
        Self {
            venue_id,
            name,
            cuisine,
            address: None,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}

/// Command to submit a rating for a venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateVenueCommand {
    pub venue_id: String,
    /// Star score, 1 to 5
    pub stars: i32,
    pub comment: String,
}

impl RateVenueCommand {
    pub fn new(venue_id: String, stars: i32, comment: String) -> Self {
        Self {
            venue_id,
            stars,
            comment,
        }
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVenueResult {
    pub venue_id: String,
}

/// Result of a replace or cuisine change on an existing venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVenueResult {
    pub venue_id: String,
    /// `false` when the stored venue already had these values
    pub modified: bool,
}

/// Result of a successful rating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateVenueResult {
    pub rating_id: String,
    pub venue_id: String,
}

/// Documents removed by a venue deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalCounts {
    pub venues_deleted: u64,
    pub ratings_deleted: u64,
}
