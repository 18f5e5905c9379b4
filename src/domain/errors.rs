//! Domain errors for the Nourish backend.

use thiserror::Error;

/// Domain-level errors surfaced by repositories and the cache-aside layer.
///
/// Cache faults never appear here: they are absorbed by the decorator.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend fault: {0}")]
    Backend(String),

    #[error("Operation cancelled or deadline exceeded")]
    Cancelled,
}

impl DomainError {
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Backend faults include cancellation: both map to a 500 at the boundary.
    pub const fn is_backend_fault(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Cancelled)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Backend(format!("serialization: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(DomainError::not_found("meal", 3).is_not_found());
        assert!(!DomainError::not_found("meal", 3).is_backend_fault());
        assert!(DomainError::Backend("boom".into()).is_backend_fault());
        assert!(DomainError::Cancelled.is_backend_fault());
        assert!(!DomainError::InvalidInput("name".into()).is_backend_fault());
    }

    #[test]
    fn test_not_found_message() {
        let err = DomainError::not_found("workout", 999);
        assert_eq!(err.to_string(), "workout not found: 999");
    }
}
