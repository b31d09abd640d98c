//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache server.
///
/// Cache operations never surface these; they come from the persistence
/// layer and the request-facing surfaces.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in any tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid HTTP request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unparseable line protocol command
    #[error("Unknown command: {0}")]
    InvalidCommand(String),

    /// Line protocol request longer than the allowed maximum
    #[error("Line exceeds {0} bytes")]
    LineTooLong(usize),

    /// Persistence file could not be read or written
    #[error("Storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted blob could not be encoded or decoded
    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_)
            | CacheError::InvalidCommand(_)
            | CacheError::LineTooLong(_) => StatusCode::BAD_REQUEST,
            CacheError::Io(_) | CacheError::Serialization(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = CacheError::NotFound("k".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = CacheError::InvalidRequest("empty".to_string()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let io = CacheError::from(std::io::Error::other("disk gone")).into_response();
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_command_error_message() {
        let err = CacheError::InvalidCommand("frobnicate_x".to_string());
        assert_eq!(err.to_string(), "Unknown command: frobnicate_x");
    }
}
