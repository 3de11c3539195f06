//! Address value object

use serde::{Deserialize, Serialize};

use super::validation::{require_exact_len, require_max_len, Validate, ValidationResult};
use super::DomainError;

const STREET_MAX_LEN: usize = 50;
const CITY_MAX_LEN: usize = 100;
const STATE_LEN: usize = 2;
const POSTAL_CODE_LEN: usize = 8;

/// Postal address of a venue. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    number: String,
    city: String,
    state: String,
    postal_code: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        number: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            number: number.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
        }
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Two-letter state code
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

impl Validate for Address {
    fn validate(&self) -> Result<ValidationResult, DomainError> {
        let mut result = ValidationResult::new();

        require_max_len(&mut result, "address.street", "Street", &self.street, STREET_MAX_LEN);
        require_max_len(&mut result, "address.city", "City", &self.city, CITY_MAX_LEN);
        require_exact_len(&mut result, "address.state", "State", &self.state, STATE_LEN);
        require_exact_len(
            &mut result,
            "address.postal_code",
            "Postal code",
            &self.postal_code,
            POSTAL_CODE_LEN,
        );

        Ok(result)
    }
}
