//! Common test utilities for integration tests
//!
//! Backend constructors and input fixtures shared by the contract, cache and
//! HTTP suites.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;

use nourish::adapters::memory::InMemoryRepository;
use nourish::adapters::sqlite::{create_migrated_test_pool, SqliteRepository};
use nourish::{MealInput, ProgressInput, Repository, WorkoutInput};

pub fn memory_repo() -> Arc<dyn Repository> {
    Arc::new(InMemoryRepository::new())
}

pub async fn sqlite_repo() -> Arc<dyn Repository> {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test database");
    Arc::new(SqliteRepository::new(pool))
}

/// Initializes a tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn meal(name: &str, calories: i64) -> MealInput {
    MealInput {
        name: name.to_string(),
        calories,
        protein: 20,
        carbs: 30,
        fat: 10,
    }
}

pub fn workout(name: &str, kind: &str) -> WorkoutInput {
    WorkoutInput {
        name: name.to_string(),
        duration: 30,
        calories_burned: 250,
        kind: kind.to_string(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn progress(y: i32, m: u32, d: u32, weight: f64) -> ProgressInput {
    ProgressInput {
        date: date(y, m, d),
        weight,
    }
}
