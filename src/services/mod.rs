//! Application services built on the repository port.

pub mod seed;

pub use seed::{generate, seed_repository, SeedData, SeedSummary, WORKOUT_KINDS};
