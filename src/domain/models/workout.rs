//! Workout domain model.

use serde::{Deserialize, Serialize};

/// A logged workout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub name: String,
    /// Minutes.
    pub duration: i64,
    pub calories_burned: i64,
    /// Free-text label such as "cardio" or "strength".
    #[serde(rename = "type")]
    pub kind: String,
}

impl Workout {
    pub const ENTITY: &'static str = "workout";

    pub fn input(&self) -> WorkoutInput {
        WorkoutInput {
            name: self.name.clone(),
            duration: self.duration,
            calories_burned: self.calories_burned,
            kind: self.kind.clone(),
        }
    }
}

/// Fields supplied when creating or replacing a workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutInput {
    pub name: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub calories_burned: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl WorkoutInput {
    pub fn into_workout(self, id: i64) -> Workout {
        Workout {
            id,
            name: self.name,
            duration: self.duration,
            calories_burned: self.calories_burned,
            kind: self.kind,
        }
    }
}
