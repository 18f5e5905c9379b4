//! Process-local storage adapter, used when no database is configured.

pub mod repository;

pub use repository::InMemoryRepository;
