//! In-memory implementation of the Repository.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::context::RequestContext;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Condition, ConditionKind, Meal, MealInput, Page, PageRequest, Progress, ProgressInput,
    Workout, WorkoutInput,
};
use crate::domain::ports::{MealFilter, ProgressFilter, Repository, WorkoutFilter};

/// Process-local repository holding one guarded collection per entity kind.
///
/// Ids are `len + 1`, assigned under the collection's write lock together
/// with the append, so concurrent creators never share an id. This scheme
/// only stays unique while nothing is ever removed.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    conditions: RwLock<Vec<Condition>>,
    meals: RwLock<Vec<Meal>>,
    workouts: RwLock<Vec<Workout>>,
    progress: RwLock<Vec<Progress>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id<T>(items: &[T]) -> i64 {
    i64::try_from(items.len()).unwrap_or(i64::MAX - 1) + 1
}

fn total<T>(items: &[T]) -> u64 {
    items.len() as u64
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_conditions(&self, ctx: &RequestContext) -> DomainResult<Vec<Condition>> {
        ctx.run(async { Ok(self.conditions.read().await.clone()) })
            .await
    }

    async fn create_condition(
        &self,
        ctx: &RequestContext,
        name: &str,
        kind: ConditionKind,
    ) -> DomainResult<i64> {
        ctx.run(async {
            let mut conditions = self.conditions.write().await;
            let id = next_id(&conditions);
            conditions.push(Condition {
                id,
                name: name.to_string(),
                kind,
            });
            Ok(id)
        })
        .await
    }

    async fn get_condition(&self, ctx: &RequestContext, id: i64) -> DomainResult<Condition> {
        ctx.run(async {
            self.conditions
                .read()
                .await
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(Condition::ENTITY, id))
        })
        .await
    }

    async fn update_condition(
        &self,
        ctx: &RequestContext,
        id: i64,
        name: &str,
        kind: ConditionKind,
    ) -> DomainResult<()> {
        ctx.run(async {
            let mut conditions = self.conditions.write().await;
            let condition = conditions
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| DomainError::not_found(Condition::ENTITY, id))?;
            condition.name = name.to_string();
            condition.kind = kind;
            Ok(())
        })
        .await
    }

    async fn list_meals(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &MealFilter,
    ) -> DomainResult<Page<Meal>> {
        ctx.run(async {
            let meals = self.meals.read().await;
            let matching: Vec<Meal> = meals.iter().filter(|m| filter.matches(m)).cloned().collect();
            Ok(Page::new(page.slice(&matching), total(&matching)))
        })
        .await
    }

    async fn get_meal(&self, ctx: &RequestContext, id: i64) -> DomainResult<Meal> {
        ctx.run(async {
            self.meals
                .read()
                .await
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(Meal::ENTITY, id))
        })
        .await
    }

    async fn create_meal(&self, ctx: &RequestContext, meal: &MealInput) -> DomainResult<i64> {
        ctx.run(async {
            let mut meals = self.meals.write().await;
            let id = next_id(&meals);
            meals.push(meal.clone().into_meal(id));
            Ok(id)
        })
        .await
    }

    async fn update_meal(&self, ctx: &RequestContext, id: i64, meal: &MealInput) -> DomainResult<()> {
        ctx.run(async {
            let mut meals = self.meals.write().await;
            let slot = meals
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| DomainError::not_found(Meal::ENTITY, id))?;
            *slot = meal.clone().into_meal(id);
            Ok(())
        })
        .await
    }

    async fn list_workouts(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &WorkoutFilter,
    ) -> DomainResult<Page<Workout>> {
        ctx.run(async {
            let workouts = self.workouts.read().await;
            let matching: Vec<Workout> =
                workouts.iter().filter(|w| filter.matches(w)).cloned().collect();
            Ok(Page::new(page.slice(&matching), total(&matching)))
        })
        .await
    }

    async fn get_workout(&self, ctx: &RequestContext, id: i64) -> DomainResult<Workout> {
        ctx.run(async {
            self.workouts
                .read()
                .await
                .iter()
                .find(|w| w.id == id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(Workout::ENTITY, id))
        })
        .await
    }

    async fn create_workout(
        &self,
        ctx: &RequestContext,
        workout: &WorkoutInput,
    ) -> DomainResult<i64> {
        ctx.run(async {
            let mut workouts = self.workouts.write().await;
            let id = next_id(&workouts);
            workouts.push(workout.clone().into_workout(id));
            Ok(id)
        })
        .await
    }

    async fn update_workout(
        &self,
        ctx: &RequestContext,
        id: i64,
        workout: &WorkoutInput,
    ) -> DomainResult<()> {
        ctx.run(async {
            let mut workouts = self.workouts.write().await;
            let slot = workouts
                .iter_mut()
                .find(|w| w.id == id)
                .ok_or_else(|| DomainError::not_found(Workout::ENTITY, id))?;
            *slot = workout.clone().into_workout(id);
            Ok(())
        })
        .await
    }

    async fn list_progress(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: &ProgressFilter,
    ) -> DomainResult<Page<Progress>> {
        ctx.run(async {
            let progress = self.progress.read().await;
            let mut matching: Vec<Progress> =
                progress.iter().filter(|p| filter.matches(p)).cloned().collect();
            matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
            Ok(Page::new(page.slice(&matching), total(&matching)))
        })
        .await
    }

    async fn store_meals(&self, ctx: &RequestContext, meals: &[MealInput]) -> DomainResult<()> {
        ctx.run(async {
            let mut stored = self.meals.write().await;
            for meal in meals {
                let id = next_id(&stored);
                stored.push(meal.clone().into_meal(id));
            }
            Ok(())
        })
        .await
    }

    async fn store_workouts(
        &self,
        ctx: &RequestContext,
        workouts: &[WorkoutInput],
    ) -> DomainResult<()> {
        ctx.run(async {
            let mut stored = self.workouts.write().await;
            for workout in workouts {
                let id = next_id(&stored);
                stored.push(workout.clone().into_workout(id));
            }
            Ok(())
        })
        .await
    }

    async fn store_progress(
        &self,
        ctx: &RequestContext,
        entries: &[ProgressInput],
    ) -> DomainResult<()> {
        ctx.run(async {
            let mut stored = self.progress.write().await;
            for entry in entries {
                let id = next_id(&stored);
                stored.push(entry.clone().into_progress(id));
            }
            Ok(())
        })
        .await
    }
}
