//! Error types for the cache
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
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A required argument (key, value, options) was missing
    #[error("Value cannot be null: {0}")]
    NullArgument(&'static str),

    /// Options rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Absolute expiration not in the future
    #[error("Invalid temporal range: {0}")]
    InvalidTemporalRange(String),

    /// Neither sliding nor absolute expiration was resolved for an entry
    #[error("Either absolute or sliding expiration needs to be provided")]
    MissingExpirationPolicy,

    /// The caller's cancellation token fired before the store call
    #[error("Operation was cancelled")]
    Cancelled,

    /// Key not found (HTTP surface only; the cache API reports absence as `None`)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Document store transport or status failure
    #[error("Store error: {0}")]
    Store(String),

    /// Stored payload could not be decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Typed value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NullArgument(_)
            | CacheError::InvalidTemporalRange(_)
            | CacheError::MissingExpirationPolicy => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            CacheError::Store(_) => StatusCode::BAD_GATEWAY,
            CacheError::InvalidConfiguration(_)
            | CacheError::Codec(_)
            | CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (CacheError::NullArgument("key"), StatusCode::BAD_REQUEST),
            (
                CacheError::InvalidTemporalRange("past".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (CacheError::MissingExpirationPolicy, StatusCode::BAD_REQUEST),
            (CacheError::NotFound("k".to_string()), StatusCode::NOT_FOUND),
            (CacheError::Cancelled, StatusCode::REQUEST_TIMEOUT),
            (
                CacheError::Store("down".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_null_argument_message_names_argument() {
        let err = CacheError::NullArgument("key");
        assert_eq!(err.to_string(), "Value cannot be null: key");
    }
}
