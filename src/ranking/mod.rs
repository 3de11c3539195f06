//! Ranking module
//!
//! Top-rated venues computed by the store's aggregation pipeline and
//! hydrated with their full rating history.

mod engine;

pub use engine::{HydrationStrategy, RankedVenue, RankingEngine, UnknownStrategy, TOP_K};
