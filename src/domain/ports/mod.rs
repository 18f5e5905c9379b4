//! Port trait definitions (Hexagonal Architecture)
//!
//! - Repository: entity persistence, implemented by the in-memory and
//!   `SQLite` adapters and wrapped by the conditions cache decorator
//! - KeyValueCache: the cache client behind the decorator

pub mod cache;
pub mod repository;

pub use cache::{CacheError, KeyValueCache};
pub use repository::{
    contains_ignore_ascii_case, MealFilter, ProgressFilter, Repository, WorkoutFilter,
};
