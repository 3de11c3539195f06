//! Cuisine kind
//!
//! Stored and exchanged as its integer code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of food a venue serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CuisineKind {
    Brazilian,
    Italian,
    Arab,
    Japanese,
    FastFood,
}

/// Integer code outside the known set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown cuisine kind code: {0}")]
pub struct UnknownCuisineKind(pub i32);

impl CuisineKind {
    pub fn code(self) -> i32 {
        match self {
            CuisineKind::Brazilian => 0,
            CuisineKind::Italian => 1,
            CuisineKind::Arab => 2,
            CuisineKind::Japanese => 3,
            CuisineKind::FastFood => 4,
        }
    }
}

impl TryFrom<i32> for CuisineKind {
    type Error = UnknownCuisineKind;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CuisineKind::Brazilian),
            1 => Ok(CuisineKind::Italian),
            2 => Ok(CuisineKind::Arab),
            3 => Ok(CuisineKind::Japanese),
            4 => Ok(CuisineKind::FastFood),
            other => Err(UnknownCuisineKind(other)),
        }
    }
}

impl From<CuisineKind> for i32 {
    fn from(kind: CuisineKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for CuisineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CuisineKind::Brazilian => write!(f, "brazilian"),
            CuisineKind::Italian => write!(f, "italian"),
            CuisineKind::Arab => write!(f, "arab"),
            CuisineKind::Japanese => write!(f, "japanese"),
            CuisineKind::FastFood => write!(f, "fast_food"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_value(CuisineKind::Japanese).unwrap();
        assert_eq!(json, serde_json::json!(3));

        let kind: CuisineKind = serde_json::from_value(serde_json::json!(1)).unwrap();
        assert_eq!(kind, CuisineKind::Italian);
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(CuisineKind::try_from(9), Err(UnknownCuisineKind(9)));
        assert!(serde_json::from_value::<CuisineKind>(serde_json::json!(-1)).is_err());
    }
}
