//! venue_catalog Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod domain;
pub mod handlers;
pub mod ranking;
pub mod repository;
pub mod schema;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::{Config, StoreBackend};
pub use domain::{Address, CuisineKind, DomainError, Rating, Validate, ValidationResult, Venue};
pub use error::{AppError, ErrorResponse};
pub use ranking::{HydrationStrategy, RankedVenue, RankingEngine, TOP_K};
