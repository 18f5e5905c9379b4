//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - Optional daily-rotated JSON log files

pub mod logger;

pub use logger::LoggerImpl;
