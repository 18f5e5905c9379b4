//! SQLite database adapter for the Nourish backend.

pub mod connection;
pub mod migrations;
pub mod repository;

pub use connection::{
    create_pool, create_test_pool, database_path, verify_connection, ConnectionError, PoolConfig,
};
pub use migrations::{Migration, MigrationError, Migrator, EMBEDDED_MIGRATIONS};
pub use repository::SqliteRepository;

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};

/// Parse an ISO-8601 calendar date from a SQLite row field.
pub fn parse_date(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DomainError::Backend(format!("invalid stored date {s:?}: {e}")))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Open a pool for `database_url` and bring the schema up to date.
pub async fn initialize_database(database_url: &str, config: PoolConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    verify_connection(&pool).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run(EMBEDDED_MIGRATIONS).await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run(EMBEDDED_MIGRATIONS).await?;
    Ok(pool)
}
