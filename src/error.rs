//! Error types for the memoization cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the memoization cache.
///
/// Failures of the wrapped computation are not represented here: they belong
/// to the caller's own error type and pass through the cache untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The inputs do not offer what the active key strategy needs
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// A custom key function returned something outside its contract
    #[error("Custom key strategy contract violation: {0}")]
    ContractViolation(String),

    /// Configuration could not be interpreted
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::KeyDerivation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::ContractViolation(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            CacheError::InvalidConfig(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the memoization cache.
pub type Result<T> = std::result::Result<T, CacheError>;
