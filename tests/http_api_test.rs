//! HTTP API tests, driven through the router without a socket.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use nourish::adapters::cache::{CachedConditionsRepository, MokaCache};
use nourish::adapters::http::{build_router, HttpConfig};
use nourish::adapters::sqlite::{create_migrated_test_pool, SqliteRepository};
use nourish::{KeyValueCache, Repository};

fn router_over(repository: Arc<dyn Repository>) -> Router {
    build_router(repository, &HttpConfig::default())
}

fn app() -> Router {
    let cache: Arc<dyn KeyValueCache> = Arc::new(MokaCache::default());
    router_over(Arc::new(CachedConditionsRepository::new(
        common::memory_repo(),
        Some(cache),
    )))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

fn assert_envelope(body: &Value, status: StatusCode, path: &str) {
    assert_eq!(body["status"], status.as_u16());
    assert_eq!(body["path"], path);
    assert!(body["error"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_and_status() {
    let app = app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "nourish");

    let (status, body) = get(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "online");
    assert!(body["endpoints"].as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn test_condition_lifecycle() {
    let app = app();

    let (status, body) = post(&app, "/api/v1/conditions", json!({"name": "Asthma", "type": "disease"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert!(body["message"].is_string());

    let (status, body) = get(&app, "/api/v1/conditions/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Asthma", "type": "disease"}));

    // Warm the cache, update, and read through it again.
    let (_, body) = get(&app, "/api/v1/conditions").await;
    assert_eq!(body["conditions"].as_array().unwrap().len(), 1);

    let (status, body) = put(&app, "/api/v1/conditions/1", json!({"name": "Knee sprain", "type": "injury"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let (_, body) = get(&app, "/api/v1/conditions").await;
    assert_eq!(body["conditions"][0]["name"], "Knee sprain");
    assert_eq!(body["conditions"][0]["type"], "injury");
}

#[tokio::test]
async fn test_condition_validation_is_400() {
    let app = app();

    let (status, body) = post(&app, "/api/v1/conditions", json!({"name": "A", "type": "allergy"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body, StatusCode::BAD_REQUEST, "/api/v1/conditions");
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("name"));
    assert!(message.contains("type"));

    let (_, body) = get(&app, "/api/v1/conditions").await;
    assert!(body["conditions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/meals")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_envelope(&body, StatusCode::BAD_REQUEST, "/api/v1/meals");
}

#[tokio::test]
async fn test_missing_entities_are_404_without_detail() {
    let app = app();

    let (status, body) = get(&app, "/api/v1/workouts/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(&body, StatusCode::NOT_FOUND, "/api/v1/workouts/999");
    assert_eq!(body["error"], "workout not found");

    let (status, _) = put(&app, "/api/v1/meals/5", json!({"name": "Toast", "calories": 100})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/api/v1/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(&body, StatusCode::NOT_FOUND, "/api/v1/nothing-here");
}

#[tokio::test]
async fn test_non_numeric_id_is_400() {
    let app = app();
    let (status, body) = get(&app, "/api/v1/meals/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body, StatusCode::BAD_REQUEST, "/api/v1/meals/abc");
}

#[tokio::test]
async fn test_meal_listing_pagination_and_filters() {
    let app = app();

    let (status, body) = get(&app, "/api/v1/meals?limit=50&offset=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"meals": [], "total": 0, "limit": 50, "offset": 0}));

    for (name, calories) in [("Oatmeal", 300), ("Chicken salad", 450), ("Chicken soup", 250)] {
        let (status, _) = post(&app, "/api/v1/meals", json!({"name": name, "calories": calories})).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = get(&app, "/api/v1/meals?limit=2&offset=1").await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["meals"].as_array().unwrap().len(), 2);
    assert_eq!(body["meals"][0]["name"], "Chicken salad");

    let (_, body) = get(&app, "/api/v1/meals?q=chicken&min_calories=300").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["meals"][0]["name"], "Chicken salad");

    // Garbage falls back to defaults instead of failing.
    let (status, body) = get(&app, "/api/v1/meals?limit=lots&offset=-4&min_calories=x&max_calories=-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 20);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["total"], 3);

    let (_, body) = get(&app, "/api/v1/meals?limit=1000").await;
    assert_eq!(body["limit"], 100);
}

#[tokio::test]
async fn test_meal_validation_and_update() {
    let app = app();

    let (status, body) = post(&app, "/api/v1/meals", json!({"name": "", "calories": -5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("calories"));

    let (_, body) = post(
        &app,
        "/api/v1/meals",
        json!({"name": "Toast", "calories": 120, "protein": 4, "carbs": 20, "fat": 2}),
    )
    .await;
    let id = body["id"].as_i64().unwrap();

    let (status, _) = put(
        &app,
        &format!("/api/v1/meals/{id}"),
        json!({"name": "Toast with butter", "calories": 200, "protein": 4, "carbs": 20, "fat": 9}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, &format!("/api/v1/meals/{id}")).await;
    assert_eq!(
        body,
        json!({"id": id, "name": "Toast with butter", "calories": 200, "protein": 4, "carbs": 20, "fat": 9})
    );
}

#[tokio::test]
async fn test_workouts_filter_by_type() {
    let app = app();
    for (name, kind) in [("Run", "cardio"), ("Lift", "strength"), ("Row", "cardio")] {
        let (status, _) = post(
            &app,
            "/api/v1/workouts",
            json!({"name": name, "duration": 30, "calories_burned": 200, "type": kind}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = get(&app, "/api/v1/workouts?type=cardio").await;
    assert_eq!(body["total"], 2);

    let (_, body) = get(&app, "/api/v1/workouts/2").await;
    assert_eq!(body["type"], "strength");

    let (status, _) = put(
        &app,
        "/api/v1/workouts/2",
        json!({"name": "Heavy lift", "duration": 45, "calories_burned": 320, "type": "strength"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get(&app, "/api/v1/workouts/2").await;
    assert_eq!(body["duration"], 45);
}

#[tokio::test]
async fn test_progress_store_and_list() {
    let app = app();

    let (status, body) = post(
        &app,
        "/api/v1/progress",
        json!([
            {"date": "2024-01-01", "weight": 81.0},
            {"date": "2024-01-15", "weight": 80.2},
            {"date": "2024-01-08", "weight": 80.7}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 3);

    let (_, body) = get(&app, "/api/v1/progress").await;
    let dates: Vec<&str> = body["progress"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-01-08", "2024-01-01"]);

    let (_, body) = get(&app, "/api/v1/progress?date_from=2024-01-02&date_to=not-a-date").await;
    assert_eq!(body["total"], 2);

    // Weight is stored as given; only malformed dates are rejected.
    let (status, body) = post(&app, "/api/v1/progress", json!([{"date": "2024-02-01", "weight": 0.0}])).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 1);

    let (status, _) = post(&app, "/api/v1/progress", json!([{"date": "01/02/2024", "weight": 80.0}])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_seeds_every_kind() {
    let app = app();

    let (status, body) = get(&app, "/api/v1/generate?count=4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"count": 4, "meals": 4, "workouts": 4, "progress": 4}));

    let (_, body) = get(&app, "/api/v1/meals").await;
    assert_eq!(body["total"], 4);
    let (_, body) = get(&app, "/api/v1/workouts?type=hiit").await;
    assert_eq!(body["total"], 1);

    let (_, body) = get(&app, "/api/v1/generate?count=0").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_backend_fault_is_generic_500() {
    let pool = create_migrated_test_pool().await.unwrap();
    sqlx::query("DROP TABLE conditions").execute(&pool).await.unwrap();
    let app = router_over(Arc::new(SqliteRepository::new(pool)));

    let (status, body) = get(&app, "/api/v1/conditions").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_envelope(&body, StatusCode::INTERNAL_SERVER_ERROR, "/api/v1/conditions");
    assert_eq!(body["error"], "Internal server error");
    assert!(!body["error"].as_str().unwrap().contains("no such table"));
}

#[tokio::test]
async fn test_legacy_condition_type_is_served_verbatim() {
    let pool = create_migrated_test_pool().await.unwrap();
    sqlx::query("INSERT INTO conditions (name, type) VALUES ('Hay fever', 'allergy')")
        .execute(&pool)
        .await
        .unwrap();
    let cache: Arc<dyn KeyValueCache> = Arc::new(MokaCache::default());
    let app = router_over(Arc::new(CachedConditionsRepository::new(
        Arc::new(SqliteRepository::new(pool)),
        Some(cache),
    )));

    let (status, _) = post(&app, "/api/v1/conditions", json!({"name": "Asthma", "type": "disease"})).await;
    assert_eq!(status, StatusCode::CREATED);

    // Served once from the store, then from the warm cache.
    for _ in 0..2 {
        let (status, body) = get(&app, "/api/v1/conditions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["conditions"],
            json!([
                {"id": 1, "name": "Hay fever", "type": "allergy"},
                {"id": 2, "name": "Asthma", "type": "disease"}
            ])
        );
    }

    // New writes still only accept the known kinds.
    let (status, _) = post(&app, "/api/v1/conditions", json!({"name": "Pollen", "type": "allergy"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expired_request_deadline_is_500() {
    let config = HttpConfig {
        request_timeout: Duration::ZERO,
        ..HttpConfig::default()
    };
    let app = build_router(common::memory_repo(), &config);

    let (status, body) = get(&app, "/api/v1/conditions").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_envelope(&body, StatusCode::INTERNAL_SERVER_ERROR, "/api/v1/conditions");

    // Routes that never touch the repository are unaffected.
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
