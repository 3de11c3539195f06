//! Ranking and cascade integration tests over the in-memory store

use venue_catalog::domain::FieldError;
use venue_catalog::handlers::{RateVenueCommand, RegisterVenueCommand, VenueHandler};
use venue_catalog::repository::{RatingRepository, VenueRepository};
use venue_catalog::{CuisineKind, HydrationStrategy, RankingEngine, Validate, Venue, TOP_K};

mod common;

async fn register(handler: &VenueHandler, name: &str, stars: &[i32]) -> String {
    let id = handler
        .register_venue(
            RegisterVenueCommand::new(name.to_string(), CuisineKind::Italian)
                .with_address(common::valid_address()),
        )
        .await
        .unwrap()
        .venue_id;

    for s in stars {
        handler
            .rate_venue(RateVenueCommand::new(id.clone(), *s, format!("{name} {s}")))
            .await
            .unwrap();
    }
    id
}

#[tokio::test]
async fn test_strategies_agree() {
    let store = common::memory_store();
    let handler = VenueHandler::new(store.clone());
    register(&handler, "Alpha", &[5, 4]).await;
    register(&handler, "Bravo", &[2, 2, 3]).await;
    register(&handler, "Charlie", &[5]).await;
    register(&handler, "Delta", &[1, 5]).await;
    register(&handler, "Echo", &[]).await;

    let engine = RankingEngine::new(store);
    let a = engine.top_rated(HydrationStrategy::PointLookup).await.unwrap();
    let b = engine.top_rated(HydrationStrategy::PipelineJoin).await.unwrap();

    assert_eq!(a.len(), TOP_K);
    assert_eq!(a, b);

    let names: Vec<_> = a.iter().map(|r| r.venue.name()).collect();
    assert_eq!(names, vec!["Charlie", "Alpha", "Delta"]);

    // Each hydrated venue carries its full history and a matching mean
    for ranked in &a {
        assert_eq!(ranked.venue.average_stars(), Some(ranked.average));
    }
}

#[tokio::test]
async fn test_equal_averages_rank_by_venue_id() {
    let store = common::memory_store();
    let handler = VenueHandler::new(store.clone());
    let mut ids = vec![
        register(&handler, "One", &[4]).await,
        register(&handler, "Two", &[4]).await,
        register(&handler, "Three", &[4]).await,
    ];
    ids.sort();

    let ranked = RankingEngine::new(store)
        .top_rated(HydrationStrategy::PipelineJoin)
        .await
        .unwrap();
    let ranked_ids: Vec<_> = ranked.iter().map(|r| r.venue.id().unwrap().to_string()).collect();

    assert_eq!(ranked_ids, ids);
}

#[tokio::test]
async fn test_removed_venue_leaves_the_ranking() {
    let store = common::memory_store();
    let handler = VenueHandler::new(store.clone());
    let top = register(&handler, "Top", &[5, 5]).await;
    register(&handler, "Mid", &[3]).await;

    let counts = handler.remove_venue(&top).await.unwrap();
    assert_eq!(counts.venues_deleted, 1);
    assert_eq!(counts.ratings_deleted, 2);

    assert!(VenueRepository::new(store.clone()).get_by_id(&top).await.unwrap().is_none());
    assert!(RatingRepository::new(store.clone()).find_for_venue(&top).await.unwrap().is_empty());

    let ranked = RankingEngine::new(store)
        .top_rated(HydrationStrategy::PointLookup)
        .await
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].venue.name(), "Mid");
}

#[tokio::test]
async fn test_update_cuisine_on_missing_id_is_false() {
    let repo = VenueRepository::new(common::memory_store());
    assert!(!repo.update_cuisine_kind("missing", CuisineKind::Arab).await.unwrap());
}

#[test]
fn test_merged_venue_and_address_errors() {
    let mut venue = Venue::new("", CuisineKind::FastFood);
    venue.attach_address(venue_catalog::Address::new("Rua", "1", "Recife", "PE", "123"));

    let result = venue.validate().unwrap();
    let fields: Vec<&str> = result.errors().iter().map(|e: &FieldError| e.field.as_str()).collect();

    assert!(fields.len() >= 2);
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"address.postal_code"));
}

#[test]
fn test_ranking_on_empty_store_blocking() {
    let engine = RankingEngine::new(common::memory_store());
    let ranked = tokio_test::block_on(engine.top_rated(HydrationStrategy::PipelineJoin)).unwrap();
    assert!(ranked.is_empty());
}
