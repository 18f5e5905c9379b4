use serde::{Deserialize, Serialize};

/// Main configuration structure for Nourish
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistent store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Conditions cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline applied to every request's repository work
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

const fn default_request_timeout_secs() -> u64 {
    10
}

const fn default_enable_cors() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            enable_cors: default_enable_cors(),
        }
    }
}

/// Database configuration
///
/// With no `url` the service runs on the in-memory repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// `SQLite` connection string, e.g. `sqlite:data/nourish.db`
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Which key-value store backs the conditions cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    None,
    Memory,
    Redis,
}

/// Conditions cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Explicit backend; a `redis_url` alone implies `redis`
    #[serde(default)]
    pub backend: Option<CacheBackend>,

    #[serde(default)]
    pub redis_url: Option<String>,

    /// Lifetime of the cached conditions list
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Upper bound on any single cache round trip
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,

    /// Entry limit for the in-process cache
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

const fn default_ttl_secs() -> u64 {
    60
}

const fn default_op_timeout_ms() -> u64 {
    250
}

const fn default_max_capacity() -> u64 {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: None,
            redis_url: None,
            ttl_secs: default_ttl_secs(),
            op_timeout_ms: default_op_timeout_ms(),
            max_capacity: default_max_capacity(),
        }
    }
}

impl CacheConfig {
    /// Resolve the effective backend.
    pub fn effective_backend(&self) -> CacheBackend {
        match (self.backend, &self.redis_url) {
            (Some(backend), _) => backend,
            (None, Some(_)) => CacheBackend::Redis,
            (None, None) => CacheBackend::None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Directory for daily-rotated JSON log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
        }
    }
}
