//! Demo data generation.
//!
//! Produces a deterministic batch of meals, workouts and progress entries
//! and loads it through the repository's bulk operations.

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::domain::context::RequestContext;
use crate::domain::errors::DomainResult;
use crate::domain::models::{MealInput, ProgressInput, WorkoutInput};
use crate::domain::ports::Repository;

/// Workout kinds, in the order generated workouts cycle through them.
pub const WORKOUT_KINDS: [&str; 4] = ["cardio", "strength", "flexibility", "hiit"];

const MEAL_NAMES: [&str; 8] = [
    "Oatmeal with berries",
    "Grilled chicken salad",
    "Salmon and rice",
    "Greek yogurt bowl",
    "Turkey wrap",
    "Lentil soup",
    "Veggie stir fry",
    "Egg white omelette",
];

const WORKOUT_NAMES: [&str; 4] = ["Morning run", "Full body lift", "Yoga flow", "Sprint intervals"];

/// Calories burned per minute, by kind.
const BURN_RATES: [i64; 4] = [10, 7, 4, 13];

const BASE_WEIGHT_TENTHS: i64 = 750;

/// One generated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub meals: Vec<MealInput>,
    pub workouts: Vec<WorkoutInput>,
    pub progress: Vec<ProgressInput>,
}

/// How many records of each kind were stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub meals: usize,
    pub workouts: usize,
    pub progress: usize,
}

/// Generate `count` records of each kind.
///
/// Progress entries fall on the `count` days before `today`, most recent
/// first, with weight drifting down toward the present.
pub fn generate(count: usize, today: NaiveDate) -> SeedData {
    let meals = (0..count).map(meal).collect();
    let workouts = (0..count).map(workout).collect();
    let progress = (0..count)
        .map(|i| {
            let days_back = i64::try_from(i).unwrap_or(i64::MAX - 1) + 1;
            ProgressInput {
                date: today - Duration::days(days_back),
                weight: (BASE_WEIGHT_TENTHS + days_back) as f64 / 10.0,
            }
        })
        .collect();

    SeedData {
        meals,
        workouts,
        progress,
    }
}

fn spread(i: usize, step: usize, modulus: usize) -> i64 {
    i64::try_from(i.wrapping_mul(step) % modulus).unwrap_or_default()
}

fn meal(i: usize) -> MealInput {
    MealInput {
        name: format!("{} #{}", MEAL_NAMES[i % MEAL_NAMES.len()], i + 1),
        calories: 250 + spread(i, 37, 500),
        protein: 10 + spread(i, 7, 40),
        carbs: 20 + spread(i, 11, 60),
        fat: 5 + spread(i, 5, 25),
    }
}

fn workout(i: usize) -> WorkoutInput {
    let slot = i % WORKOUT_KINDS.len();
    let duration = 20 + spread(i, 5, 40);
    WorkoutInput {
        name: format!("{} #{}", WORKOUT_NAMES[slot], i + 1),
        duration,
        calories_burned: duration * BURN_RATES[slot],
        kind: WORKOUT_KINDS[slot].to_string(),
    }
}

/// Store a generated batch using the three bulk operations.
pub async fn seed_repository<R: Repository + ?Sized>(
    repository: &R,
    ctx: &RequestContext,
    data: &SeedData,
) -> DomainResult<SeedSummary> {
    repository.store_meals(ctx, &data.meals).await?;
    repository.store_workouts(ctx, &data.workouts).await?;
    repository.store_progress(ctx, &data.progress).await?;

    let summary = SeedSummary {
        meals: data.meals.len(),
        workouts: data.workouts.len(),
        progress: data.progress.len(),
    };
    info!(
        meals = summary.meals,
        workouts = summary.workouts,
        progress = summary.progress,
        "Seeded demo data"
    );
    Ok(summary)
}
