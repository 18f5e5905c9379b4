//! Adapters binding the domain ports to concrete technology.

pub mod cache;
pub mod http;
pub mod memory;
pub mod sqlite;
