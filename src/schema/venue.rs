//! Venue document

use serde::{Deserialize, Serialize};

use crate::domain::{Address, CuisineKind, Venue};

use super::MapperError;

/// Nested address of a venue document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub street: String,
    pub number: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl From<&Address> for AddressRecord {
    fn from(address: &Address) -> Self {
        Self {
            street: address.street().to_string(),
            number: address.number().to_string(),
            city: address.city().to_string(),
            state: address.state().to_string(),
            postal_code: address.postal_code().to_string(),
        }
    }
}

impl From<AddressRecord> for Address {
    fn from(record: AddressRecord) -> Self {
        Address::new(
            record.street,
            record.number,
            record.city,
            record.state,
            record.postal_code,
        )
    }
}

/// Document of the `venues` collection. Ratings live in their own collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub cuisine: CuisineKind,
    pub address: AddressRecord,
}

impl VenueRecord {
    /// Record for a first insert; the store assigns the identifier.
    pub fn for_insert(venue: &Venue) -> Result<Self, MapperError> {
        let address = venue.address().ok_or(MapperError::MissingAddress)?;
        Ok(Self {
            id: None,
            name: venue.name().to_string(),
            cuisine: venue.cuisine(),
            address: address.into(),
        })
    }

    /// Record for a full replace, keyed by the venue's identifier.
    pub fn for_replace(venue: &Venue) -> Result<Self, MapperError> {
        let id = venue.id().ok_or(MapperError::MissingId)?;
        Ok(Self {
            id: Some(id.to_string()),
            ..Self::for_insert(venue)?
        })
    }

    /// Rebuild the venue with its address. Ratings are left empty.
    pub fn into_domain(self) -> Result<Venue, MapperError> {
        let id = self.id.ok_or(MapperError::MissingId)?;
        let mut venue = Venue::with_id(id, self.name, self.cuisine);
        venue.attach_address(self.address.into());
        Ok(venue)
    }
}
