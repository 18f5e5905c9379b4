//! Nourish - nutrition and fitness tracking backend
//!
//! Stores health conditions, meals, workouts and body-weight progress
//! behind a single repository contract, with interchangeable SQLite and
//! in-memory backends and a cache-aside layer for the conditions list.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors, request context and ports
//! - **Adapters** (`adapters`): storage backends, caches and the HTTP API
//! - **Service Layer** (`services`): demo data generation
//! - **Infrastructure Layer** (`infrastructure`): config, logging, startup wiring
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use nourish::adapters::memory::InMemoryRepository;
//! use nourish::domain::models::ConditionKind;
//! use nourish::{Repository, RequestContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let repository = InMemoryRepository::new();
//!     let ctx = RequestContext::background();
//!     let id = repository.create_condition(&ctx, "Asthma", ConditionKind::Disease).await?;
//!     assert_eq!(id, 1);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Condition, ConditionKind, Config, Meal, MealInput, NewCondition, Page, PageRequest, Progress,
    ProgressInput, Workout, WorkoutInput,
};
pub use domain::ports::{
    CacheError, KeyValueCache, MealFilter, ProgressFilter, Repository, WorkoutFilter,
};
pub use domain::{DomainError, DomainResult, RequestContext};
pub use infrastructure::config::{ConfigError, ConfigLoader};
