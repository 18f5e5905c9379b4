//! Networked key-value cache backed by Redis.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;

use crate::domain::ports::{CacheError, KeyValueCache};

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

/// `KeyValueCache` over a shared, auto-reconnecting Redis connection.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        tracing::info!("Connected to redis cache");
        Ok(Self { connection })
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        Ok(connection.get::<_, Option<String>>(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        // SET EX takes whole seconds; never let a sub-second ttl become "no expiry".
        let seconds = ttl.as_secs().max(1);
        connection.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        connection.del::<_, ()>(key).await?;
        Ok(())
    }
}
