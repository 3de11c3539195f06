//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use venue_catalog::api::{self, AppState};
use venue_catalog::store::{DocumentStore, MemoryDocumentStore};
use venue_catalog::{Address, HydrationStrategy};

const MIGRATION: &str = include_str!("../../migrations/0001_collections.sql");

/// Fresh in-memory store
pub fn memory_store() -> Arc<dyn DocumentStore> {
    Arc::new(MemoryDocumentStore::new())
}

/// Full application over a fresh in-memory store
pub fn memory_app() -> Router {
    api::build_app(AppState::new(memory_store(), HydrationStrategy::default()))
}

/// An address that passes every rule
pub fn valid_address() -> Address {
    Address::new("Rua Augusta", "1500", "São Paulo", "SP", "01304001")
}

/// Setup test database - apply the schema and empty both collections
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    for statement in MIGRATION.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("Failed to apply migration");
    }

    sqlx::query("TRUNCATE TABLE venues, ratings RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}
