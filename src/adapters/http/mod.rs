//! HTTP API.
//!
//! Exposes the repository operations as JSON endpoints under `/api/v1`,
//! plus health, status and demo-data routes. Every failure is rendered
//! through the shared error envelope.

pub mod dto;
pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::models::ServerConfig;
use crate::domain::ports::Repository;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
    /// Deadline applied to each request's repository work.
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for HttpConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            enable_cors: server.enable_cors,
            request_timeout: Duration::from_secs(server.request_timeout_secs),
        }
    }
}

/// Build the application router over `repository`.
pub fn build_router(repository: Arc<dyn Repository>, config: &HttpConfig) -> Router {
    let state = Arc::new(AppState {
        repository,
        request_timeout: config.request_timeout,
    });

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/status", get(handlers::api_status))
        // Conditions
        .route(
            "/api/v1/conditions",
            get(handlers::list_conditions).post(handlers::create_condition),
        )
        .route(
            "/api/v1/conditions/{id}",
            get(handlers::get_condition).put(handlers::update_condition),
        )
        // Meals
        .route(
            "/api/v1/meals",
            get(handlers::list_meals).post(handlers::create_meal),
        )
        .route(
            "/api/v1/meals/{id}",
            get(handlers::get_meal).put(handlers::update_meal),
        )
        // Workouts
        .route(
            "/api/v1/workouts",
            get(handlers::list_workouts).post(handlers::create_workout),
        )
        .route(
            "/api/v1/workouts/{id}",
            get(handlers::get_workout).put(handlers::update_workout),
        )
        // Progress
        .route(
            "/api/v1/progress",
            get(handlers::list_progress).post(handlers::store_progress),
        )
        .route("/api/v1/generate", get(handlers::generate).post(handlers::generate))
        .fallback(handlers::route_not_found)
        .with_state(state);

    with_layers(app, config)
}

/// Middleware shared by every route. A panicking handler is answered with
/// the generic 500 envelope instead of a dropped connection.
fn with_layers(app: Router, config: &HttpConfig) -> Router {
    let app = app.layer(CatchPanicLayer::custom(error::panic_response));
    let app = if config.enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    } else {
        app
    };
    app.layer(TraceLayer::new_for_http())
}

/// Bind the configured address. `host` may be a hostname or an IP literal.
pub async fn bind(config: &HttpConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port)).await
}

/// HTTP server owning its configuration and repository.
pub struct HttpServer {
    config: HttpConfig,
    repository: Arc<dyn Repository>,
}

impl HttpServer {
    pub fn new(repository: Arc<dyn Repository>, config: HttpConfig) -> Self {
        Self { config, repository }
    }

    pub fn router(&self) -> Router {
        build_router(self.repository.clone(), &self.config)
    }

    /// Start the server and run until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();

        let listener = bind(&self.config).await?;
        tracing::info!(addr = %listener.local_addr()?, host = %self.config.host, "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::domain::models::ServerConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn test_config_from_server_section() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            request_timeout_secs: 3,
            enable_cors: false,
        };
        let config = HttpConfig::from(&server);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert!(!config.enable_cors);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_bind_accepts_hostname() {
        let config = HttpConfig {
            host: "localhost".to_string(),
            port: 0,
            ..HttpConfig::default()
        };
        let listener = bind(&config).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_serve_on_hostname_until_shutdown() {
        let config = HttpConfig {
            host: "localhost".to_string(),
            port: 0,
            ..HttpConfig::default()
        };
        let server = HttpServer::new(Arc::new(InMemoryRepository::new()), config);
        server.serve_with_shutdown(async {}).await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500_envelope() {
        async fn explode() -> &'static str {
            panic!("handler exploded")
        }

        let app = Router::new().route("/boom", get(explode));
        let app = with_layers(app, &HttpConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, 500);
        assert_eq!(body.error, "Internal server error");
        assert!(!body.error.contains("exploded"));
    }

    #[test]
    fn test_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.enable_cors);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
