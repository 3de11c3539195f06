//! Rating document

use serde::{Deserialize, Serialize};

use crate::domain::Rating;

/// Document of the `ratings` collection.
///
/// `venue_id` only exists for storage-side keying and is dropped when the
/// record becomes a domain [`Rating`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub venue_id: String,
    pub stars: i32,
    pub comment: String,
}

impl RatingRecord {
    pub fn new(venue_id: &str, rating: &Rating) -> Self {
        Self {
            id: None,
            venue_id: venue_id.to_string(),
            stars: rating.stars(),
            comment: rating.comment().to_string(),
        }
    }

    pub fn into_domain(self) -> Rating {
        Rating::new(self.stars, self.comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::from_document;
    use serde_json::json;

    #[test]
    fn test_record_carries_venue_id() {
        let record = RatingRecord::new("v1", &Rating::new(4, "good"));
        assert_eq!(record.venue_id, "v1");
        assert!(record.id.is_none());
    }

    #[test]
    fn test_into_domain_drops_keys() {
        let doc = json!({ "_id": "r1", "venue_id": "v1", "stars": 3, "comment": "ok" });
        let rating = from_document::<RatingRecord>(doc).unwrap().into_domain();
        assert_eq!(rating, Rating::new(3, "ok"));
    }
}
