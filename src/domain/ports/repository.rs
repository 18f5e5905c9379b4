//! Repository port: the only way handlers reach stored data.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::context::RequestContext;
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Condition, ConditionKind, Meal, MealInput, Page, PageRequest, Progress, ProgressInput,
    Workout, WorkoutInput,
};

/// Filter criteria for listing meals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealFilter {
    /// Case-insensitive substring match on the meal name. Only ASCII letters
    /// are folded, so `"CRÈME"` matches `"crÈme"` but not `"crème"`. Both
    /// backends fold the same way (SQLite's built-in `lower()` is ASCII-only).
    pub name_query: Option<String>,
    /// Inclusive lower bound on calories.
    pub min_calories: Option<i64>,
    /// Inclusive upper bound on calories.
    pub max_calories: Option<i64>,
}

impl MealFilter {
    /// Translate the legacy sentinel encoding (`""` = any name, `-1` = no
    /// calorie bound) into the optional form.
    pub fn from_sentinels(query: &str, min_calories: i64, max_calories: i64) -> Self {
        Self {
            name_query: (!query.is_empty()).then(|| query.to_string()),
            min_calories: (min_calories >= 0).then_some(min_calories),
            max_calories: (max_calories >= 0).then_some(max_calories),
        }
    }

    /// Whether `meal` satisfies every active clause.
    pub fn matches(&self, meal: &Meal) -> bool {
        if let Some(query) = &self.name_query {
            if !contains_ignore_ascii_case(&meal.name, query) {
                return false;
            }
        }
        if self.min_calories.is_some_and(|min| meal.calories < min) {
            return false;
        }
        if self.max_calories.is_some_and(|max| meal.calories > max) {
            return false;
        }
        true
    }
}

/// Filter criteria for listing workouts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutFilter {
    /// Exact match on the workout type label.
    pub kind: Option<String>,
}

impl WorkoutFilter {
    pub fn matches(&self, workout: &Workout) -> bool {
        self.kind.as_ref().is_none_or(|kind| &workout.kind == kind)
    }
}

/// Filter criteria for listing progress entries. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ProgressFilter {
    pub fn matches(&self, entry: &Progress) -> bool {
        self.date_from.is_none_or(|from| entry.date >= from)
            && self.date_to.is_none_or(|to| entry.date <= to)
    }
}

/// ASCII case-insensitive substring test. Both storage backends compare
/// names this way so their results agree.
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Repository interface for all entity persistence.
///
/// Listing operations return the page together with the number of rows
/// matching the filter, independent of the window. `get_*` and `update_*`
/// return `DomainError::NotFound` for an absent id.
#[async_trait]
pub trait Repository: Send + Sync {
    /// All conditions ordered by id.
    async fn list_conditions(&self, ctx: &RequestContext) -> DomainResult<Vec<Condition>>;

    /// Create a condition and return its assigned id.
    async fn create_condition(
        &self,
        ctx: &RequestContext,
        name: &str,
        kind: ConditionKind,
    ) -> DomainResult<i64>;

    async fn get_condition(&self, ctx: &RequestContext, id: i64) -> DomainResult<Condition>;

    /// Replace name and kind of an existing condition.
    async fn update_condition(
        &self,
        ctx: &RequestContext,
        id: i64,
        name: &str,
        kind: ConditionKind,
    ) -> DomainResult<()>;

    /// Meals ordered by id.
    async fn list_meals(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &MealFilter,
    ) -> DomainResult<Page<Meal>>;

    async fn get_meal(&self, ctx: &RequestContext, id: i64) -> DomainResult<Meal>;

    async fn create_meal(&self, ctx: &RequestContext, meal: &MealInput) -> DomainResult<i64>;

    async fn update_meal(&self, ctx: &RequestContext, id: i64, meal: &MealInput) -> DomainResult<()>;

    /// Workouts ordered by id.
    async fn list_workouts(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &WorkoutFilter,
    ) -> DomainResult<Page<Workout>>;

    async fn get_workout(&self, ctx: &RequestContext, id: i64) -> DomainResult<Workout>;

    async fn create_workout(&self, ctx: &RequestContext, workout: &WorkoutInput)
        -> DomainResult<i64>;

    async fn update_workout(
        &self,
        ctx: &RequestContext,
        id: i64,
        workout: &WorkoutInput,
    ) -> DomainResult<()>;

    /// Progress entries ordered newest first (date descending, then id
    /// descending). The ordering is part of the contract.
    async fn list_progress(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &ProgressFilter,
    ) -> DomainResult<Page<Progress>>;

    /// Insert every meal or none of them.
    async fn store_meals(&self, ctx: &RequestContext, meals: &[MealInput]) -> DomainResult<()>;

    /// Insert every workout or none of them.
    async fn store_workouts(&self, ctx: &RequestContext, workouts: &[WorkoutInput])
        -> DomainResult<()>;

    /// Insert every progress entry or none of them.
    async fn store_progress(&self, ctx: &RequestContext, entries: &[ProgressInput])
        -> DomainResult<()>;
}
