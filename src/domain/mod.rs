//! Domain layer for the Nourish backend
//!
//! Entity models, the error taxonomy, the per-request execution context and
//! the port traits that storage and cache adapters implement.

pub mod context;
pub mod errors;
pub mod models;
pub mod ports;

pub use context::RequestContext;
pub use errors::{DomainError, DomainResult};
