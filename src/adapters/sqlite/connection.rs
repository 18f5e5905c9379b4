//! Pool construction for the SQLite store.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::DatabaseConfig;

const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Not a sqlite connection string: {0}")]
    InvalidDatabaseUrl(String),
    #[error("Failed to create database directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open pool: {0}")]
    PoolCreationFailed(#[source] sqlx::Error),
    #[error("Database did not answer a probe query: {0}")]
    ConnectionFailed(#[source] sqlx::Error),
}

/// Pool sizing and lock-wait limits.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(3),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&DatabaseConfig> for PoolConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            ..Self::default()
        }
    }
}

/// File backing `database_url`, or `None` for in-memory databases.
pub fn database_path(database_url: &str) -> Result<Option<PathBuf>, ConnectionError> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .ok_or_else(|| ConnectionError::InvalidDatabaseUrl(database_url.to_string()))?;
    let rest = rest.split_once('?').map_or(rest, |(path, _)| path);

    if rest.is_empty() || rest == ":memory:" {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(rest)))
}

/// Open a pool on `database_url`, creating the file and its directory when
/// missing. Journals in WAL mode so readers never block the single writer.
pub async fn create_pool(database_url: &str, config: PoolConfig) -> Result<SqlitePool, ConnectionError> {
    if let Some(path) = database_path(database_url)? {
        ensure_parent_dir(&path)?;
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|_| ConnectionError::InvalidDatabaseUrl(database_url.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(config.busy_timeout);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
        .map_err(ConnectionError::PoolCreationFailed)
}

/// Single-connection in-memory pool; the database lives as long as the
/// connection does.
pub async fn create_test_pool() -> Result<SqlitePool, ConnectionError> {
    let options = SqliteConnectOptions::from_str(MEMORY_URL)
        .map_err(|_| ConnectionError::InvalidDatabaseUrl(MEMORY_URL.to_string()))?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(ConnectionError::PoolCreationFailed)
}

pub async fn verify_connection(pool: &SqlitePool) -> Result<(), ConnectionError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(ConnectionError::ConnectionFailed)?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), ConnectionError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|source| ConnectionError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
