use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{CacheBackend, Config};

/// Config file read from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "nourish.yaml";

/// Prefix of environment overrides; nesting uses `__`.
pub const ENV_PREFIX: &str = "NOURISH_";

/// Unprefixed variables honoured for deployment compatibility.
const LEGACY_ENV_KEYS: [&str; 3] = ["PORT", "DATABASE_URL", "REDIS_URL"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    MissingFile(String),

    #[error("Invalid port: 0")]
    InvalidPort,

    #[error("Invalid request_timeout_secs: 0. Must be at least 1")]
    InvalidRequestTimeout,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid cache ttl_secs: 0. Must be at least 1")]
    InvalidCacheTtl,

    #[error("Cache backend is redis but no redis_url is set")]
    MissingRedisUrl,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `nourish.yaml` in the working directory (optional)
    /// 3. `NOURISH_*` environment variables
    /// 4. `PORT`, `DATABASE_URL`, `REDIS_URL`
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment(DEFAULT_CONFIG_FILE)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Same layering as [`ConfigLoader::load`] with an explicit file, which
    /// must exist.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.display().to_string()).into());
        }

        let config: Config = Self::figment(path)
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The layered provider stack, before extraction.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(legacy_env())
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if config.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidRequestTimeout);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        if config.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidCacheTtl);
        }

        if config.cache.effective_backend() == CacheBackend::Redis && config.cache.redis_url.is_none() {
            return Err(ConfigError::MissingRedisUrl);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

fn legacy_env() -> Env {
    Env::raw().only(&LEGACY_ENV_KEYS).map(|key| {
        if key.as_str().eq_ignore_ascii_case("PORT") {
            "server.port".into()
        } else if key.as_str().eq_ignore_ascii_case("DATABASE_URL") {
            "database.url".into()
        } else if key.as_str().eq_ignore_ascii_case("REDIS_URL") {
            "cache.redis_url".into()
        } else {
            key.into()
        }
    })
}
