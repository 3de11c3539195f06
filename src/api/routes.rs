//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{Address, CuisineKind, Rating, Venue};
use crate::error::AppError;
use crate::handlers::{
    RateVenueCommand, RateVenueResult, RegisterVenueCommand, RegisterVenueResult, RemovalCounts,
    ReplaceVenueCommand, UpdateVenueResult, VenueHandler,
};
use crate::ranking::{HydrationStrategy, RankedVenue, RankingEngine};
use crate::repository::{RatingRepository, VenueRepository};
use crate::store::DocumentStore;

/// Shared state of every route
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    /// Used by `/venues/top-rated` when the request names no strategy
    pub strategy: HydrationStrategy,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, strategy: HydrationStrategy) -> Self {
        Self { store, strategy }
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct VenueRequest {
    pub name: String,
    pub cuisine: CuisineKind,
    pub address: Address,
}

#[derive(Debug, Deserialize)]
pub struct CuisineRequest {
    pub cuisine: CuisineKind,
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub stars: i32,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct NameSearchQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TextSearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct TopRatedQuery {
    #[serde(default)]
    pub strategy: Option<HydrationStrategy>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub stars: i32,
    pub comment: String,
}

impl From<&Rating> for RatingResponse {
    fn from(rating: &Rating) -> Self {
        Self {
            stars: rating.stars(),
            comment: rating.comment().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenueResponse {
    pub id: Option<String>,
    pub name: String,
    pub cuisine: CuisineKind,
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<RatingResponse>,
}

impl From<&Venue> for VenueResponse {
    fn from(venue: &Venue) -> Self {
        Self {
            id: venue.id().map(str::to_string),
            name: venue.name().to_string(),
            cuisine: venue.cuisine(),
            address: venue.address().cloned(),
            ratings: venue.ratings().iter().map(RatingResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankedVenueResponse {
    pub venue: VenueResponse,
    pub average: f64,
}

impl From<&RankedVenue> for RankedVenueResponse {
    fn from(ranked: &RankedVenue) -> Self {
        Self {
            venue: VenueResponse::from(&ranked.venue),
            average: ranked.average,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopRatedResponse {
    pub strategy: HydrationStrategy,
    pub venues: Vec<RankedVenueResponse>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/venues", post(register_venue).get(list_venues))
        .route("/venues/search", get(search_by_name))
        .route("/venues/text-search", get(text_search))
        .route("/venues/top-rated", get(top_rated))
        .route(
            "/venues/:venue_id",
            get(get_venue).put(replace_venue).delete(remove_venue),
        )
        .route("/venues/:venue_id/cuisine", patch(change_cuisine))
        .route("/venues/:venue_id/ratings", post(rate_venue))
}

// =========================================================================
// Venues
// =========================================================================

/// Register a new venue
async fn register_venue(
    State(state): State<AppState>,
    Json(request): Json<VenueRequest>,
) -> Result<(StatusCode, Json<RegisterVenueResult>), AppError> {
    let handler = VenueHandler::new(state.store);

    let command =
        RegisterVenueCommand::new(request.name, request.cuisine).with_address(request.address);
    let result = handler.register_venue(command).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// List every venue
async fn list_venues(State(state): State<AppState>) -> Result<Json<Vec<VenueResponse>>, AppError> {
    let venues = VenueRepository::new(state.store).get_all().await?;

    Ok(Json(venues.iter().map(VenueResponse::from).collect()))
}

/// Get a venue with its ratings
async fn get_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<String>,
) -> Result<Json<VenueResponse>, AppError> {
    let mut venue = VenueRepository::new(state.store.clone())
        .get_by_id(&venue_id)
        .await?
        .ok_or_else(|| AppError::VenueNotFound(venue_id.clone()))?;

    for rating in RatingRepository::new(state.store).find_for_venue(&venue_id).await? {
        venue.append_rating(rating);
    }

    Ok(Json(VenueResponse::from(&venue)))
}

/// Case-insensitive substring search on the name
async fn search_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameSearchQuery>,
) -> Result<Json<Vec<VenueResponse>>, AppError> {
    let venues = VenueRepository::new(state.store)
        .get_by_name_contains(&query.name)
        .await?;

    Ok(Json(venues.iter().map(VenueResponse::from).collect()))
}

/// Full-text search, best match first
async fn text_search(
    State(state): State<AppState>,
    Query(query): Query<TextSearchQuery>,
) -> Result<Json<Vec<VenueResponse>>, AppError> {
    let venues = VenueRepository::new(state.store)
        .full_text_search(&query.q)
        .await?;

    Ok(Json(venues.iter().map(VenueResponse::from).collect()))
}

/// Overwrite a venue
async fn replace_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<String>,
    Json(request): Json<VenueRequest>,
) -> Result<Json<UpdateVenueResult>, AppError> {
    let handler = VenueHandler::new(state.store);

    let command = ReplaceVenueCommand::new(venue_id, request.name, request.cuisine)
        .with_address(request.address);
    let result = handler.replace_venue(command).await?;

    Ok(Json(result))
}

/// Change only the cuisine kind
async fn change_cuisine(
    State(state): State<AppState>,
    Path(venue_id): Path<String>,
    Json(request): Json<CuisineRequest>,
) -> Result<Json<UpdateVenueResult>, AppError> {
    let handler = VenueHandler::new(state.store);
    let result = handler.change_cuisine(&venue_id, request.cuisine).await?;

    Ok(Json(result))
}

/// Delete a venue and all of its ratings
async fn remove_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<String>,
) -> Result<Json<RemovalCounts>, AppError> {
    let handler = VenueHandler::new(state.store);
    let counts = handler.remove_venue(&venue_id).await?;

    Ok(Json(counts))
}

// =========================================================================
// Ratings
// =========================================================================

/// Rate a venue
async fn rate_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<String>,
    Json(request): Json<RatingRequest>,
) -> Result<(StatusCode, Json<RateVenueResult>), AppError> {
    let handler = VenueHandler::new(state.store);

    let command = RateVenueCommand::new(venue_id, request.stars, request.comment);
    let result = handler.rate_venue(command).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Top-rated venues with their full rating history
async fn top_rated(
    State(state): State<AppState>,
    Query(query): Query<TopRatedQuery>,
) -> Result<Json<TopRatedResponse>, AppError> {
    let strategy = query.strategy.unwrap_or(state.strategy);
    let ranked = RankingEngine::new(state.store).top_rated(strategy).await?;

    Ok(Json(TopRatedResponse {
        strategy,
        venues: ranked.iter().map(RankedVenueResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_request_deserialize() {
        let json = r#"{
            "name": "Cantina",
            "cuisine": 1,
            "address": {
                "street": "Rua Augusta",
                "number": "1500",
                "city": "São Paulo",
                "state": "SP",
                "postal_code": "01304001"
            }
        }"#;

        let request: VenueRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.cuisine, CuisineKind::Italian);
        assert_eq!(request.address.city(), "São Paulo");
    }

    #[test]
    fn test_unknown_cuisine_code_is_rejected() {
        let json = r#"{"cuisine": 9}"#;
        assert!(serde_json::from_str::<CuisineRequest>(json).is_err());
    }

    #[test]
    fn test_top_rated_query_defaults() {
        let query: TopRatedQuery = serde_json::from_str("{}").unwrap();
        assert!(query.strategy.is_none());

        let query: TopRatedQuery = serde_json::from_str(r#"{"strategy": "point_lookup"}"#).unwrap();
        assert_eq!(query.strategy, Some(HydrationStrategy::PointLookup));
    }

    #[test]
    fn test_venue_response_omits_empty_ratings() {
        let venue = Venue::with_id("v1", "Cantina", CuisineKind::Italian);
        let json = serde_json::to_value(VenueResponse::from(&venue)).unwrap();

        assert_eq!(json["id"], "v1");
        assert_eq!(json["cuisine"], 1);
        assert!(json.get("ratings").is_none());
    }
}
