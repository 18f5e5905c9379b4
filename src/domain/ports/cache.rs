//! Key-value cache port used by the cache-aside layer.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a cache client. Callers treat all of them as soft.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// String-keyed store with per-entry expiry.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Fetch a value; `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
