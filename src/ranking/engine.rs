//! Ranking Engine
//!
//! Step 1 always runs in the store: group ratings by venue, average the
//! stars, sort descending and keep the first K groups. Equal averages keep
//! the group emission order, which is ascending venue id.
//!
//! Step 2 hydrates each ranked venue in one of two ways:
//! - [`HydrationStrategy::PointLookup`]: one venue lookup and one rating
//!   query per group (1 + 2K round trips), for stores without joins
//! - [`HydrationStrategy::PipelineJoin`]: two lookup stages appended to the
//!   pipeline so a single round trip returns everything
//!
//! Both yield the same venues with the same averages. A venue deleted
//! between grouping and hydration is skipped by either strategy.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::Venue;
use crate::repository::{RatingRepository, RepositoryError, VenueRepository, VENUE_ID_FIELD};
use crate::schema::{from_document, RatingRecord, VenueRecord};
use crate::store::{DocumentStore, Stage, ID_FIELD, RATINGS, VENUES};

/// Number of venues in the top-rated ranking
pub const TOP_K: usize = 3;

const AVERAGE_FIELD: &str = "average";
const JOINED_VENUE_FIELD: &str = "venue";
const JOINED_RATINGS_FIELD: &str = "ratings";

/// How ranked venues are hydrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationStrategy {
    PointLookup,
    #[default]
    PipelineJoin,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown hydration strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for HydrationStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point_lookup" => Ok(HydrationStrategy::PointLookup),
            "pipeline_join" => Ok(HydrationStrategy::PipelineJoin),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for HydrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HydrationStrategy::PointLookup => write!(f, "point_lookup"),
            HydrationStrategy::PipelineJoin => write!(f, "pipeline_join"),
        }
    }
}

/// A venue with every rating attached and its mean star count
#[derive(Debug, Clone, PartialEq)]
pub struct RankedVenue {
    pub venue: Venue,
    pub average: f64,
}

/// Output of the group/sort/limit stages
#[derive(Debug, Deserialize)]
struct RankedGroup {
    #[serde(rename = "_id")]
    venue_id: String,
    average: f64,
}

/// Output of the group stages extended with both lookups
#[derive(Debug, Deserialize)]
struct JoinedGroup {
    #[serde(rename = "_id")]
    venue_id: String,
    average: f64,
    #[serde(default)]
    venue: Vec<VenueRecord>,
    #[serde(default)]
    ratings: Vec<RatingRecord>,
}

/// Computes the top-rated venues
#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn DocumentStore>,
    venues: VenueRepository,
    ratings: RatingRepository,
    top_k: usize,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            venues: VenueRepository::new(store.clone()),
            ratings: RatingRepository::new(store.clone()),
            store,
            top_k: TOP_K,
        }
    }

    /// Override the ranking size
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Highest-rated venues first, hydrated with the given strategy.
    pub async fn top_rated(
        &self,
        strategy: HydrationStrategy,
    ) -> Result<Vec<RankedVenue>, RepositoryError> {
        tracing::debug!(%strategy, top_k = self.top_k, "Computing top-rated venues");
        match strategy {
            HydrationStrategy::PointLookup => self.top_rated_point_lookup().await,
            HydrationStrategy::PipelineJoin => self.top_rated_pipeline_join().await,
        }
    }

    /// Rank in the store, then look each venue and its ratings up separately.
    pub async fn top_rated_point_lookup(&self) -> Result<Vec<RankedVenue>, RepositoryError> {
        let groups = self
            .store
            .aggregate(RATINGS, &self.ranking_pipeline())
            .await?
            .into_iter()
            .map(from_document::<RankedGroup>)
            .collect::<Result<Vec<_>, _>>()?;

        let mut ranked = Vec::with_capacity(groups.len());
        for group in groups {
            let Some(mut venue) = self.venues.get_by_id(&group.venue_id).await? else {
                tracing::warn!(venue_id = %group.venue_id, "Ranked venue vanished before hydration, skipping");
                continue;
            };

            for rating in self.ratings.find_for_venue(&group.venue_id).await? {
                venue.append_rating(rating);
            }

            ranked.push(RankedVenue {
                venue,
                average: group.average,
            });
        }

        Ok(ranked)
    }

    /// Rank and join venues and ratings in a single pipeline.
    pub async fn top_rated_pipeline_join(&self) -> Result<Vec<RankedVenue>, RepositoryError> {
        let mut pipeline = self.ranking_pipeline();
        pipeline.push(Stage::lookup(VENUES, ID_FIELD, ID_FIELD, JOINED_VENUE_FIELD));
        pipeline.push(Stage::lookup(RATINGS, ID_FIELD, VENUE_ID_FIELD, JOINED_RATINGS_FIELD));

        let documents = self.store.aggregate(RATINGS, &pipeline).await?;

        let mut ranked = Vec::with_capacity(documents.len());
        for document in documents {
            let group: JoinedGroup = from_document(document)?;

            // A join yields at most one venue per identifier
            let Some(record) = group.venue.into_iter().next() else {
                tracing::warn!(venue_id = %group.venue_id, "Ranked venue has no joined record, skipping");
                continue;
            };

            let mut venue = record.into_domain()?;
            for rating in group.ratings {
                venue.append_rating(rating.into_domain());
            }

            ranked.push(RankedVenue {
                venue,
                average: group.average,
            });
        }

        Ok(ranked)
    }

    fn ranking_pipeline(&self) -> Vec<Stage> {
        vec![
            Stage::group_average(VENUE_ID_FIELD, "stars", AVERAGE_FIELD),
            Stage::sort_descending(AVERAGE_FIELD),
            Stage::Limit(self.top_k),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, CuisineKind, Rating};
    use crate::store::MemoryDocumentStore;

    async fn seed(store: Arc<dyn DocumentStore>, ratings: &[(&str, Vec<i32>)]) -> Vec<String> {
        let venues = VenueRepository::new(store.clone());
        let repo = RatingRepository::new(store);
        let mut ids = Vec::new();
        for (name, stars) in ratings {
            let mut venue = Venue::new(*name, CuisineKind::Brazilian);
            venue.attach_address(Address::new("Rua", "1", "Recife", "PE", "50000000"));
            let id = venues.insert(&venue).await.unwrap();
            for s in stars.iter() {
                repo.insert(&id, &Rating::new(*s, format!("{name} {s}"))).await.unwrap();
            }
            ids.push(id);
        }
        ids
    }

    #[test]
    fn test_strategy_parse_and_display() {
        assert_eq!("point_lookup".parse::<HydrationStrategy>(), Ok(HydrationStrategy::PointLookup));
        assert_eq!("pipeline_join".parse::<HydrationStrategy>(), Ok(HydrationStrategy::PipelineJoin));
        assert!("join".parse::<HydrationStrategy>().is_err());
        assert_eq!(HydrationStrategy::default().to_string(), "pipeline_join");
    }

    #[tokio::test]
    async fn test_ranking_order_and_cutoff() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        seed(
            store.clone(),
            &[
                ("A", vec![5, 5]),
                ("B", vec![3]),
                ("C", vec![4, 4, 4]),
                ("D", vec![1]),
            ],
        )
        .await;

        let engine = RankingEngine::new(store);
        for strategy in [HydrationStrategy::PointLookup, HydrationStrategy::PipelineJoin] {
            let top = engine.top_rated(strategy).await.unwrap();
            let names: Vec<_> = top.iter().map(|r| r.venue.name()).collect();
            let averages: Vec<_> = top.iter().map(|r| r.average).collect();

            assert_eq!(names, vec!["A", "C", "B"], "{strategy}");
            assert_eq!(averages, vec![5.0, 4.0, 3.0], "{strategy}");
            assert_eq!(top[1].venue.ratings().len(), 3);
        }

        let top4 = engine.with_top_k(4).top_rated_pipeline_join().await.unwrap();
        assert_eq!(top4.len(), 4);
        assert_eq!(top4[3].venue.name(), "D");
    }

    #[tokio::test]
    async fn test_fewer_rated_venues_than_k() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        seed(store.clone(), &[("Rated", vec![4]), ("Unrated", vec![])]).await;

        let engine = RankingEngine::new(store);
        let top = engine.top_rated_point_lookup().await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].venue.name(), "Rated");

        assert!(RankingEngine::new(Arc::new(MemoryDocumentStore::new()))
            .top_rated_pipeline_join()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_vanished_venue_is_skipped_by_both_strategies() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let ids = seed(store.clone(), &[("Gone", vec![5]), ("Kept", vec![2])]).await;

        // Delete the venue document but leave its ratings behind
        VenueRepository::new(store.clone()).delete(&ids[0]).await.unwrap();

        let engine = RankingEngine::new(store);
        let a = engine.top_rated_point_lookup().await.unwrap();
        let b = engine.top_rated_pipeline_join().await.unwrap();

        assert_eq!(a.len(), 1);
        assert_eq!(a[0].venue.name(), "Kept");
        assert_eq!(a, b);
    }
}
