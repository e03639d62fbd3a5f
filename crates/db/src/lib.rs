//! Record store for floor-plans, votes, thermostats, and thermostat settings.
//!
//! - [`models`] -- row structs and request DTOs.
//! - [`repositories`] -- stateless sqlx query helpers over a [`DbPool`].
//! - [`store`] -- the [`RecordStore`] seam the engine talks to, with a
//!   PostgreSQL and an in-memory implementation.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub use store::{MemoryRecordStore, PgRecordStore, RecordStore, StoreResult};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
