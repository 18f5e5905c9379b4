//! Startup wiring
//!
//! Chooses the storage backend and the conditions cache from configuration
//! and assembles the repository shared by the HTTP layer and the CLI.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::cache::{CachedConditionsRepository, MokaCache, RedisCache};
use crate::adapters::memory::InMemoryRepository;
use crate::adapters::sqlite::{initialize_database, PoolConfig, SqliteRepository};
use crate::domain::models::config::{CacheBackend, Config};
use crate::domain::ports::{KeyValueCache, Repository};

/// Upper bound on establishing the redis connection at startup.
const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the configured store: SQLite when `database.url` is set, otherwise
/// the in-memory repository.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn Repository>> {
    let Some(url) = config.database.url.as_deref() else {
        warn!("No database url configured; data lives in memory and is lost on exit");
        return Ok(Arc::new(InMemoryRepository::new()));
    };

    let pool = initialize_database(url, PoolConfig::from(&config.database))
        .await
        .with_context(|| format!("Failed to initialize database at {url}"))?;
    info!(max_connections = config.database.max_connections, "Using SQLite repository");
    Ok(Arc::new(SqliteRepository::new(pool)))
}

/// Build the conditions cache. A redis backend that cannot be reached is
/// logged and replaced by no cache.
pub async fn build_cache(config: &Config) -> Option<Arc<dyn KeyValueCache>> {
    match config.cache.effective_backend() {
        CacheBackend::None => None,
        CacheBackend::Memory => {
            info!(max_capacity = config.cache.max_capacity, "Using in-process conditions cache");
            Some(Arc::new(MokaCache::new(config.cache.max_capacity)) as Arc<dyn KeyValueCache>)
        }
        CacheBackend::Redis => {
            let url = config.cache.redis_url.as_deref()?;
            match tokio::time::timeout(REDIS_CONNECT_TIMEOUT, RedisCache::connect(url)).await {
                Ok(Ok(cache)) => Some(Arc::new(cache) as Arc<dyn KeyValueCache>),
                Ok(Err(e)) => {
                    warn!(error = %e, "Redis unavailable; continuing without cache");
                    None
                }
                Err(_) => {
                    warn!(timeout = ?REDIS_CONNECT_TIMEOUT, "Redis connect timed out; continuing without cache");
                    None
                }
            }
        }
    }
}

/// The repository the application runs on: the configured store wrapped
/// once in the conditions cache-aside layer.
pub async fn build_app_repository(config: &Config) -> Result<Arc<dyn Repository>> {
    let store = build_repository(config).await?;
    let cache = build_cache(config).await;

    let repository = CachedConditionsRepository::new(store, cache)
        .with_ttl(Duration::from_secs(config.cache.ttl_secs))
        .with_op_timeout(Duration::from_millis(config.cache.op_timeout_ms));
    Ok(Arc::new(repository))
}
