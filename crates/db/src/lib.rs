//! SQLite persistence for the relay: pool creation, migrations, and the
//! generation-history repository.
//!
//! History is the only durable state. Job tracking stays in memory -- a
//! relay restart abandons in-flight jobs by design.

pub mod models;
pub mod repositories;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Database connection pool used across the workspace.
pub type DbPool = sqlx::SqlitePool;

/// Create a connection pool for `database_url`, creating the database file
/// when it does not exist yet.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Apply embedded migrations from the crate's `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap connectivity probe used by the health endpoint.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
