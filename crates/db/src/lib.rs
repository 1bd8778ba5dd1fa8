//! PostgreSQL persistence for the learning management system.
//!
//! Repositories are zero-sized structs whose async methods take `&PgPool`.
//! Enrollment writes and lesson completion go through
//! [`repositories::ProgressRepo`], which drives the core progress engine over
//! a transactional [`progress_store::PgProgressStore`].

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod progress_store;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
