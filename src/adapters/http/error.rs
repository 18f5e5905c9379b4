//! Error envelope returned by every failing HTTP request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::domain::errors::DomainError;

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
    pub timestamp: String,
    pub path: String,
}

/// An HTTP failure carrying its status, public message and request path.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    path: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            path: String::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    /// Attach the request path reported in the envelope.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity, id } => {
                tracing::debug!(entity, id, "Entity not found");
                Self::not_found(format!("{entity} not found"))
            }
            DomainError::InvalidInput(message) => Self::bad_request(message),
            DomainError::Cancelled => {
                tracing::warn!("Request cancelled or deadline exceeded");
                Self::internal()
            }
            DomainError::Backend(detail) => {
                tracing::error!(error = %detail, "Backend fault");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            status: self.status.as_u16(),
            timestamp: Utc::now().to_rfc3339(),
            path: self.path,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Response for a handler that panicked. The payload goes to the log only.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    tracing::error!(panic = %detail, "Handler panicked");
    ApiError::internal().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_mapping_hides_backend_detail() {
        let err = ApiError::from(DomainError::Backend("disk I/O error at /var/db".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("disk"));

        let err = ApiError::from(DomainError::Cancelled);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_is_generic() {
        let err = ApiError::from(DomainError::not_found("meal", 42));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "meal not found");
    }

    #[test]
    fn test_invalid_input_keeps_complaint() {
        let err = ApiError::from(DomainError::InvalidInput("name is required".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "name is required");
    }
}
