//! Venue aggregate root

use super::validation::{require_max_len, Validate, ValidationResult};
use super::{Address, CuisineKind, DomainError, Rating};

const NAME_MAX_LEN: usize = 30;

/// A venue with its address and submitted ratings.
///
/// # Invariants
/// - `id` is `None` until the store assigns one on insert
/// - the address must be attached before [`Validate::validate`] is called
/// - ratings keep submission order
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    id: Option<String>,
    name: String,
    cuisine: CuisineKind,
    address: Option<Address>,
    ratings: Vec<Rating>,
}

impl Venue {
    /// Create a venue that has not been stored yet.
    pub fn new(name: impl Into<String>, cuisine: CuisineKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            cuisine,
            address: None,
            ratings: Vec::new(),
        }
    }

    /// Rebuild a venue loaded from the store. Ratings start empty.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, cuisine: CuisineKind) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(name, cuisine)
        }
    }

    pub fn attach_address(&mut self, address: Address) {
        self.address = Some(address);
    }

    pub fn append_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cuisine(&self) -> CuisineKind {
        self.cuisine
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Mean of the attached ratings' stars, `None` when there are none.
    pub fn average_stars(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let total: i64 = self.ratings.iter().map(|r| i64::from(r.stars())).sum();
        Some(total as f64 / self.ratings.len() as f64)
    }
}

impl Validate for Venue {
    fn validate(&self) -> Result<ValidationResult, DomainError> {
        let mut result = ValidationResult::new();

        require_max_len(&mut result, "name", "Name", &self.name, NAME_MAX_LEN);

        let address = self.address.as_ref().ok_or(DomainError::MissingAddress)?;
        result.merge(address.validate()?);

        Ok(result)
    }
}
