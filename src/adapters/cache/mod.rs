//! Caching layer for the conditions listing.
//!
//! `CachedConditionsRepository` wraps any `Repository` as a cache-aside
//! decorator over a `KeyValueCache`: `MokaCache` in process, or
//! `RedisCache` over the network.

pub mod cached_conditions_repository;
pub mod moka_cache;
pub mod redis_cache;

pub use cached_conditions_repository::{CachedConditionsRepository, CONDITIONS_CACHE_KEY};
pub use moka_cache::MokaCache;
pub use redis_cache::RedisCache;
