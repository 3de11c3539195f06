//! Rating value object

use serde::{Deserialize, Serialize};

use super::validation::{require_max_len, Validate, ValidationResult};
use super::DomainError;

const MAX_STARS: i32 = 5;
const COMMENT_MAX_LEN: usize = 100;

/// A single star score with a comment.
///
/// Stars are kept as submitted; out-of-range values are reported by
/// [`Validate::validate`] instead of being rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    stars: i32,
    comment: String,
}

impl Rating {
    pub fn new(stars: i32, comment: impl Into<String>) -> Self {
        Self {
            stars,
            comment: comment.into(),
        }
    }

    pub fn stars(&self) -> i32 {
        self.stars
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

impl Validate for Rating {
    fn validate(&self) -> Result<ValidationResult, DomainError> {
        let mut result = ValidationResult::new();

        if self.stars <= 0 {
            result.add_error("stars", "Stars must be greater than zero.");
        }
        if self.stars > MAX_STARS {
            result.add_error("stars", format!("Stars must be at most {MAX_STARS}."));
        }
        require_max_len(&mut result, "comment", "Comment", &self.comment, COMMENT_MAX_LEN);

        Ok(result)
    }
}
