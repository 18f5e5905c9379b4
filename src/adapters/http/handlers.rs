//! Route handlers. Each one validates its input, calls exactly one
//! repository operation (or the seed service) under a per-request context,
//! and renders the result.

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode, Uri},
    response::Json,
};
use chrono::{Local, Utc};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::dto::{
    ConditionRequest, ConditionsResponse, GenerateQuery, GenerateResponse, HealthResponse,
    MealQuery, MealsResponse, MutationResponse, ProgressQuery, ProgressResponse, StatusResponse,
    StoredResponse, Validate, WorkoutQuery, WorkoutsResponse,
};
use super::error::{ApiError, ApiResult};
use crate::domain::context::RequestContext;
use crate::domain::models::{
    Condition, Meal, MealInput, Progress, ProgressInput, Workout, WorkoutInput,
};
use crate::domain::ports::Repository;
use crate::services::seed;

pub const SERVICE_NAME: &str = "nourish";

/// Shared state handed to every handler.
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub request_timeout: Duration,
}

/// Per-request scope: the context bounding repository work and the path
/// reported in error envelopes.
pub struct RequestScope {
    pub ctx: RequestContext,
    pub path: String,
}

impl RequestScope {
    fn fail(&self, err: impl Into<ApiError>) -> ApiError {
        let _span = tracing::info_span!("request", request_id = %self.ctx.request_id()).entered();
        err.into().at(self.path.clone())
    }

    fn parse_id(&self, raw: &str) -> ApiResult<i64> {
        raw.parse()
            .map_err(|_| self.fail(ApiError::bad_request(format!("Invalid id: {raw}"))))
    }

    fn decode<T: Validate>(&self, body: Result<Json<T>, JsonRejection>) -> ApiResult<T::Output> {
        let Json(body) = body.map_err(|rejection| {
            self.fail(ApiError::bad_request(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )))
        })?;
        body.validate().map_err(|complaints| {
            self.fail(ApiError::bad_request(format!(
                "Validation failed: {}",
                complaints.join("; ")
            )))
        })
    }
}

impl FromRequestParts<Arc<AppState>> for RequestScope {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            ctx: RequestContext::with_timeout(state.request_timeout),
            path: parts.uri.path().to_string(),
        })
    }
}

type AppStateRef = State<Arc<AppState>>;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn api_status() -> Json<StatusResponse> {
    let endpoints = [
        "/health",
        "/api/v1/conditions",
        "/api/v1/meals",
        "/api/v1/workouts",
        "/api/v1/progress",
        "/api/v1/generate",
    ];
    Json(StatusResponse {
        status: "online".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: endpoints.iter().map(ToString::to_string).collect(),
    })
}

pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found("Route not found").at(uri.path())
}

// Conditions

pub async fn list_conditions(
    State(state): AppStateRef,
    scope: RequestScope,
) -> ApiResult<Json<ConditionsResponse>> {
    let conditions = state
        .repository
        .list_conditions(&scope.ctx)
        .await
        .map_err(|e| scope.fail(e))?;
    Ok(Json(ConditionsResponse { conditions }))
}

pub async fn create_condition(
    State(state): AppStateRef,
    scope: RequestScope,
    body: Result<Json<ConditionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let condition = scope.decode(body)?;
    let id = state
        .repository
        .create_condition(&scope.ctx, &condition.name, condition.kind)
        .await
        .map_err(|e| scope.fail(e))?;

    info!(request_id = %scope.ctx.request_id(), entity = Condition::ENTITY, id, "Created");
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            id,
            message: "Condition created".to_string(),
        }),
    ))
}

pub async fn get_condition(
    State(state): AppStateRef,
    scope: RequestScope,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Condition>> {
    let id = scope.parse_id(&raw_id)?;
    let condition = state
        .repository
        .get_condition(&scope.ctx, id)
        .await
        .map_err(|e| scope.fail(e))?;
    Ok(Json(condition))
}

pub async fn update_condition(
    State(state): AppStateRef,
    scope: RequestScope,
    Path(raw_id): Path<String>,
    body: Result<Json<ConditionRequest>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let id = scope.parse_id(&raw_id)?;
    let condition = scope.decode(body)?;
    state
        .repository
        .update_condition(&scope.ctx, id, &condition.name, condition.kind)
        .await
        .map_err(|e| scope.fail(e))?;

    info!(request_id = %scope.ctx.request_id(), entity = Condition::ENTITY, id, "Updated");
    Ok(Json(MutationResponse {
        id,
        message: "Condition updated".to_string(),
    }))
}

// Meals

pub async fn list_meals(
    State(state): AppStateRef,
    scope: RequestScope,
    Query(query): Query<MealQuery>,
) -> ApiResult<Json<MealsResponse>> {
    let request = query.page();
    let page = state
        .repository
        .list_meals(&scope.ctx, request, &query.filter())
        .await
        .map_err(|e| scope.fail(e))?;
    Ok(Json(MealsResponse::new(page, request)))
}

pub async fn create_meal(
    State(state): AppStateRef,
    scope: RequestScope,
    body: Result<Json<MealInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let meal = scope.decode(body)?;
    let id = state
        .repository
        .create_meal(&scope.ctx, &meal)
        .await
        .map_err(|e| scope.fail(e))?;

    info!(request_id = %scope.ctx.request_id(), entity = Meal::ENTITY, id, "Created");
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            id,
            message: "Meal created".to_string(),
        }),
    ))
}

pub async fn get_meal(
    State(state): AppStateRef,
    scope: RequestScope,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Meal>> {
    let id = scope.parse_id(&raw_id)?;
    let meal = state
        .repository
        .get_meal(&scope.ctx, id)
        .await
        .map_err(|e| scope.fail(e))?;
    Ok(Json(meal))
}

pub async fn update_meal(
    State(state): AppStateRef,
    scope: RequestScope,
    Path(raw_id): Path<String>,
    body: Result<Json<MealInput>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let id = scope.parse_id(&raw_id)?;
    let meal = scope.decode(body)?;
    state
        .repository
        .update_meal(&scope.ctx, id, &meal)
        .await
        .map_err(|e| scope.fail(e))?;

    info!(request_id = %scope.ctx.request_id(), entity = Meal::ENTITY, id, "Updated");
    Ok(Json(MutationResponse {
        id,
        message: "Meal updated".to_string(),
    }))
}

// Workouts

pub async fn list_workouts(
    State(state): AppStateRef,
    scope: RequestScope,
    Query(query): Query<WorkoutQuery>,
) -> ApiResult<Json<WorkoutsResponse>> {
    let request = query.page();
    let page = state
        .repository
        .list_workouts(&scope.ctx, request, &query.filter())
        .await
        .map_err(|e| scope.fail(e))?;
    Ok(Json(WorkoutsResponse::new(page, request)))
}

pub async fn create_workout(
    State(state): AppStateRef,
    scope: RequestScope,
    body: Result<Json<WorkoutInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let workout = scope.decode(body)?;
    let id = state
        .repository
        .create_workout(&scope.ctx, &workout)
        .await
        .map_err(|e| scope.fail(e))?;

    info!(request_id = %scope.ctx.request_id(), entity = Workout::ENTITY, id, "Created");
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            id,
            message: "Workout created".to_string(),
        }),
    ))
}

pub async fn get_workout(
    State(state): AppStateRef,
    scope: RequestScope,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Workout>> {
    let id = scope.parse_id(&raw_id)?;
    let workout = state
        .repository
        .get_workout(&scope.ctx, id)
        .await
        .map_err(|e| scope.fail(e))?;
    Ok(Json(workout))
}

pub async fn update_workout(
    State(state): AppStateRef,
    scope: RequestScope,
    Path(raw_id): Path<String>,
    body: Result<Json<WorkoutInput>, JsonRejection>,
) -> ApiResult<Json<MutationResponse>> {
    let id = scope.parse_id(&raw_id)?;
    let workout = scope.decode(body)?;
    state
        .repository
        .update_workout(&scope.ctx, id, &workout)
        .await
        .map_err(|e| scope.fail(e))?;

    info!(request_id = %scope.ctx.request_id(), entity = Workout::ENTITY, id, "Updated");
    Ok(Json(MutationResponse {
        id,
        message: "Workout updated".to_string(),
    }))
}

// Progress

pub async fn list_progress(
    State(state): AppStateRef,
    scope: RequestScope,
    Query(query): Query<ProgressQuery>,
) -> ApiResult<Json<ProgressResponse>> {
    let request = query.page();
    let page = state
        .repository
        .list_progress(&scope.ctx, request, &query.filter())
        .await
        .map_err(|e| scope.fail(e))?;
    Ok(Json(ProgressResponse::new(page, request)))
}

pub async fn store_progress(
    State(state): AppStateRef,
    scope: RequestScope,
    body: Result<Json<Vec<ProgressInput>>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StoredResponse>)> {
    let entries = scope.decode(body)?;
    state
        .repository
        .store_progress(&scope.ctx, &entries)
        .await
        .map_err(|e| scope.fail(e))?;

    info!(request_id = %scope.ctx.request_id(), entity = Progress::ENTITY, count = entries.len(), "Stored");
    Ok((
        StatusCode::CREATED,
        Json(StoredResponse {
            count: entries.len(),
            message: "Progress recorded".to_string(),
        }),
    ))
}

// Demo data

pub async fn generate(
    State(state): AppStateRef,
    scope: RequestScope,
    Query(query): Query<GenerateQuery>,
) -> ApiResult<Json<GenerateResponse>> {
    let count = query.count();
    let data = seed::generate(count, Local::now().date_naive());
    let summary = seed::seed_repository(state.repository.as_ref(), &scope.ctx, &data)
        .await
        .map_err(|e| scope.fail(e))?;

    Ok(Json(GenerateResponse {
        count,
        meals: summary.meals,
        workouts: summary.workouts,
        progress: summary.progress,
    }))
}
