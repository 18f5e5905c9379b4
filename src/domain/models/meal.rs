//! Meal domain model.

use serde::{Deserialize, Serialize};

/// A logged meal with its macro-nutrient breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl Meal {
    pub const ENTITY: &'static str = "meal";

    /// The mutable fields of this meal.
    pub fn input(&self) -> MealInput {
        MealInput {
            name: self.name.clone(),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

/// Fields supplied when creating or replacing a meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealInput {
    pub name: String,
    #[serde(default)]
    pub calories: i64,
    #[serde(default)]
    pub protein: i64,
    #[serde(default)]
    pub carbs: i64,
    #[serde(default)]
    pub fat: i64,
}

impl MealInput {
    pub fn into_meal(self, id: i64) -> Meal {
        Meal {
            id,
            name: self.name,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}
