//! Infrastructure layer module
//!
//! Process-level concerns around the domain:
//! - Configuration loading (figment)
//! - Logging initialisation (tracing)
//! - Startup wiring of storage and cache backends

pub mod config;
pub mod logging;
pub mod setup;
