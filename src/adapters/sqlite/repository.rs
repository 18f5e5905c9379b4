//! SQLite implementation of the Repository.
//!
//! Filtered listings are assembled with `QueryBuilder`, which numbers and
//! binds placeholders in push order. The same predicate builder feeds the
//! count query and the page query, so both always bind identical filter
//! arguments and `LIMIT`/`OFFSET` are always the last two binds.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};

use super::parse_date;
use crate::domain::context::RequestContext;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Condition, ConditionKind, Meal, MealInput, Page, PageRequest, Progress, ProgressInput,
    Workout, WorkoutInput,
};
use crate::domain::ports::{MealFilter, ProgressFilter, Repository, WorkoutFilter};

const INSERT_MEAL: &str =
    "INSERT INTO meals (name, calories, protein, carbs, fat) VALUES (?, ?, ?, ?, ?)";
const INSERT_WORKOUT: &str =
    "INSERT INTO workouts (name, duration, calories_burned, type) VALUES (?, ?, ?, ?)";
const INSERT_PROGRESS: &str = "INSERT INTO progress (date, weight) VALUES (?, ?)";

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn push_meal_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &MealFilter) {
    qb.push(" WHERE 1=1");
    if let Some(query) = &filter.name_query {
        qb.push(" AND instr(lower(name), ")
            .push_bind(query.to_ascii_lowercase())
            .push(") > 0");
    }
    if let Some(min) = filter.min_calories {
        qb.push(" AND calories >= ").push_bind(min);
    }
    if let Some(max) = filter.max_calories {
        qb.push(" AND calories <= ").push_bind(max);
    }
}

fn push_workout_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &WorkoutFilter) {
    qb.push(" WHERE 1=1");
    if let Some(kind) = &filter.kind {
        qb.push(" AND type = ").push_bind(kind.clone());
    }
}

fn push_progress_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProgressFilter) {
    qb.push(" WHERE 1=1");
    if let Some(from) = filter.date_from {
        qb.push(" AND date >= ").push_bind(from.to_string());
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND date <= ").push_bind(to.to_string());
    }
}

fn push_window(qb: &mut QueryBuilder<'_, Sqlite>, page: PageRequest) {
    qb.push(" LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(i64::from(page.offset));
}

fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Roll back `tx` and describe which row sank the batch.
async fn abort_batch(
    tx: sqlx::Transaction<'_, Sqlite>,
    entity: &'static str,
    index: usize,
    size: usize,
    err: &sqlx::Error,
) -> DomainError {
    warn!(entity, index, size, error = %err, "Bulk insert failed, rolling back batch");
    if let Err(rollback_err) = tx.rollback().await {
        return DomainError::Backend(format!(
            "bulk insert of {size} {entity} rows failed at row {index}: {err}; rollback failed: {rollback_err}"
        ));
    }
    DomainError::Backend(format!("bulk insert of {size} {entity} rows failed at row {index}: {err}"))
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn list_conditions(&self, ctx: &RequestContext) -> DomainResult<Vec<Condition>> {
        ctx.run(async {
            let rows: Vec<ConditionRow> =
                sqlx::query_as("SELECT id, name, type FROM conditions ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?;
            Ok(rows.into_iter().map(Condition::from).collect())
        })
        .await
    }

    async fn create_condition(
        &self,
        ctx: &RequestContext,
        name: &str,
        kind: ConditionKind,
    ) -> DomainResult<i64> {
        ctx.run(async {
            let result = sqlx::query("INSERT INTO conditions (name, type) VALUES (?, ?)")
                .bind(name)
                .bind(kind.as_str())
                .execute(&self.pool)
                .await?;
            let id = result.last_insert_rowid();
            debug!(id, "Created condition");
            Ok(id)
        })
        .await
    }

    async fn get_condition(&self, ctx: &RequestContext, id: i64) -> DomainResult<Condition> {
        ctx.run(async {
            let row: Option<ConditionRow> =
                sqlx::query_as("SELECT id, name, type FROM conditions WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            row.map(Condition::from)
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
            let result = sqlx::query("UPDATE conditions SET name = ?, type = ? WHERE id = ?")
                .bind(name)
                .bind(kind.as_str())
                .bind(id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(Condition::ENTITY, id));
            }
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
            let mut tx = self.pool.begin().await?;

            let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM meals");
            push_meal_filter(&mut count, filter);
            let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

            let mut select =
                QueryBuilder::<Sqlite>::new("SELECT id, name, calories, protein, carbs, fat FROM meals");
            push_meal_filter(&mut select, filter);
            select.push(" ORDER BY id");
            push_window(&mut select, page);
            let rows: Vec<MealRow> = select.build_query_as::<MealRow>().fetch_all(&mut *tx).await?;

            tx.commit().await?;
            Ok(Page::new(rows.into_iter().map(Meal::from).collect(), to_total(total)))
        })
        .await
    }

    async fn get_meal(&self, ctx: &RequestContext, id: i64) -> DomainResult<Meal> {
        ctx.run(async {
            let row: Option<MealRow> = sqlx::query_as(
                "SELECT id, name, calories, protein, carbs, fat FROM meals WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            row.map(Meal::from)
                .ok_or_else(|| DomainError::not_found(Meal::ENTITY, id))
        })
        .await
    }

    async fn create_meal(&self, ctx: &RequestContext, meal: &MealInput) -> DomainResult<i64> {
        ctx.run(async {
            let result = sqlx::query(INSERT_MEAL)
                .bind(&meal.name)
                .bind(meal.calories)
                .bind(meal.protein)
                .bind(meal.carbs)
                .bind(meal.fat)
                .execute(&self.pool)
                .await?;
            Ok(result.last_insert_rowid())
        })
        .await
    }

    async fn update_meal(&self, ctx: &RequestContext, id: i64, meal: &MealInput) -> DomainResult<()> {
        ctx.run(async {
            let result = sqlx::query(
                "UPDATE meals SET name = ?, calories = ?, protein = ?, carbs = ?, fat = ? WHERE id = ?",
            )
            .bind(&meal.name)
            .bind(meal.calories)
            .bind(meal.protein)
            .bind(meal.carbs)
            .bind(meal.fat)
            .bind(id)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(Meal::ENTITY, id));
            }
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
            let mut tx = self.pool.begin().await?;

            let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM workouts");
            push_workout_filter(&mut count, filter);
            let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

            let mut select = QueryBuilder::<Sqlite>::new(
                "SELECT id, name, duration, calories_burned, type FROM workouts",
            );
            push_workout_filter(&mut select, filter);
            select.push(" ORDER BY id");
            push_window(&mut select, page);
            let rows: Vec<WorkoutRow> = select.build_query_as::<WorkoutRow>().fetch_all(&mut *tx).await?;

            tx.commit().await?;
            Ok(Page::new(rows.into_iter().map(Workout::from).collect(), to_total(total)))
        })
        .await
    }

    async fn get_workout(&self, ctx: &RequestContext, id: i64) -> DomainResult<Workout> {
        ctx.run(async {
            let row: Option<WorkoutRow> = sqlx::query_as(
                "SELECT id, name, duration, calories_burned, type FROM workouts WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            row.map(Workout::from)
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
            let result = sqlx::query(INSERT_WORKOUT)
                .bind(&workout.name)
                .bind(workout.duration)
                .bind(workout.calories_burned)
                .bind(&workout.kind)
                .execute(&self.pool)
                .await?;
            Ok(result.last_insert_rowid())
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
            let result = sqlx::query(
                "UPDATE workouts SET name = ?, duration = ?, calories_burned = ?, type = ? WHERE id = ?",
            )
            .bind(&workout.name)
            .bind(workout.duration)
            .bind(workout.calories_burned)
            .bind(&workout.kind)
            .bind(id)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(Workout::ENTITY, id));
            }
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
            let mut tx = self.pool.begin().await?;

            let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM progress");
            push_progress_filter(&mut count, filter);
            let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

            let mut select = QueryBuilder::<Sqlite>::new("SELECT id, date, weight FROM progress");
            push_progress_filter(&mut select, filter);
            select.push(" ORDER BY date DESC, id DESC");
            push_window(&mut select, page);
            let rows: Vec<ProgressRow> = select.build_query_as::<ProgressRow>().fetch_all(&mut *tx).await?;

            tx.commit().await?;
            let items = rows
                .into_iter()
                .map(Progress::try_from)
                .collect::<DomainResult<Vec<Progress>>>()?;
            Ok(Page::new(items, to_total(total)))
        })
        .await
    }

    // Bulk stores: one transaction per batch. `sqlx` prepares the insert once
    // per connection and re-executes it for every row.

    async fn store_meals(&self, ctx: &RequestContext, meals: &[MealInput]) -> DomainResult<()> {
        ctx.run(async {
            let mut tx = self.pool.begin().await?;
            for (index, meal) in meals.iter().enumerate() {
                let result = sqlx::query(INSERT_MEAL)
                    .bind(&meal.name)
                    .bind(meal.calories)
                    .bind(meal.protein)
                    .bind(meal.carbs)
                    .bind(meal.fat)
                    .execute(&mut *tx)
                    .await;
                if let Err(err) = result {
                    return Err(abort_batch(tx, Meal::ENTITY, index, meals.len(), &err).await);
                }
            }
            tx.commit().await?;
            debug!(count = meals.len(), "Stored meals");
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
            let mut tx = self.pool.begin().await?;
            for (index, workout) in workouts.iter().enumerate() {
                let result = sqlx::query(INSERT_WORKOUT)
                    .bind(&workout.name)
                    .bind(workout.duration)
                    .bind(workout.calories_burned)
                    .bind(&workout.kind)
                    .execute(&mut *tx)
                    .await;
                if let Err(err) = result {
                    return Err(abort_batch(tx, Workout::ENTITY, index, workouts.len(), &err).await);
                }
            }
            tx.commit().await?;
            debug!(count = workouts.len(), "Stored workouts");
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
            let mut tx = self.pool.begin().await?;
            for (index, entry) in entries.iter().enumerate() {
                let result = sqlx::query(INSERT_PROGRESS)
                    .bind(entry.date.to_string())
                    .bind(entry.weight)
                    .execute(&mut *tx)
                    .await;
                if let Err(err) = result {
                    return Err(abort_batch(tx, Progress::ENTITY, index, entries.len(), &err).await);
                }
            }
            tx.commit().await?;
            debug!(count = entries.len(), "Stored progress entries");
            Ok(())
        })
        .await
    }
}

#[derive(sqlx::FromRow)]
struct ConditionRow {
    id: i64,
    name: String,
    #[sqlx(rename = "type")]
    kind: String,
}

impl From<ConditionRow> for Condition {
    fn from(row: ConditionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            kind: ConditionKind::from(row.kind),
        }
    }
}

#[derive(sqlx::FromRow)]
struct MealRow {
    id: i64,
    name: String,
    calories: i64,
    protein: i64,
    carbs: i64,
    fat: i64,
}

impl From<MealRow> for Meal {
    fn from(row: MealRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            calories: row.calories,
            protein: row.protein,
            carbs: row.carbs,
            fat: row.fat,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WorkoutRow {
    id: i64,
    name: String,
    duration: i64,
    calories_burned: i64,
    #[sqlx(rename = "type")]
    kind: String,
}

impl From<WorkoutRow> for Workout {
    fn from(row: WorkoutRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            duration: row.duration,
            calories_burned: row.calories_burned,
            kind: row.kind,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProgressRow {
    id: i64,
    date: String,
    weight: f64,
}

impl TryFrom<ProgressRow> for Progress {
    type Error = DomainError;

    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            date: parse_date(&row.date)?,
            weight: row.weight,
        })
    }
}
