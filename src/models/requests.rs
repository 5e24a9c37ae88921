//! Request DTOs for the cache HTTP API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::cache::EntryOptions;
use crate::error::{CacheError, Result};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store, as UTF-8 text
/// - `sliding_secs`: Optional sliding window in seconds
/// - `absolute_in_secs`: Optional deadline relative to now, in seconds
/// - `absolute_at`: Optional RFC 3339 deadline
///
/// With no expiration field the cache's default sliding window applies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub sliding_secs: Option<u64>,
    #[serde(default)]
    pub absolute_in_secs: Option<u64>,
    #[serde(default)]
    pub absolute_at: Option<DateTime<Utc>>,
}

impl SetRequest {
    /// Splits the request into key, value and expiration options.
    ///
    /// Fails with `NullArgument` when the key or value is missing.
    pub fn into_parts(self) -> Result<(String, String, EntryOptions)> {
        let key = self
            .key
            .filter(|k| !k.is_empty())
            .ok_or(CacheError::NullArgument("key"))?;
        let value = self.value.ok_or(CacheError::NullArgument("value"))?;

        let options = EntryOptions {
            absolute_expiration: self.absolute_at,
            absolute_expiration_relative_to_now: self.absolute_in_secs.map(Duration::from_secs),
            sliding_expiration: self.sliding_secs.map(Duration::from_secs),
        };

        Ok((key, value, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": "hello"}"#;
        let (key, value, options) = serde_json::from_str::<SetRequest>(json)
            .unwrap()
            .into_parts()
            .unwrap();
        assert_eq!(key, "test");
        assert_eq!(value, "hello");
        assert!(options.is_empty());
    }

    #[test]
    fn test_set_request_with_expirations() {
        let json = r#"{"key": "test", "value": "hello", "sliding_secs": 60,
                       "absolute_at": "2030-01-01T00:00:00Z"}"#;
        let (_, _, options) = serde_json::from_str::<SetRequest>(json)
            .unwrap()
            .into_parts()
            .unwrap();
        assert_eq!(options.sliding_expiration, Some(Duration::from_secs(60)));
        assert!(options.absolute_expiration.is_some());
        assert!(options.absolute_expiration_relative_to_now.is_none());
    }

    #[test]
    fn test_missing_key_is_null_argument() {
        let req: SetRequest = serde_json::from_str(r#"{"value": "hello"}"#).unwrap();
        assert!(matches!(
            req.into_parts(),
            Err(CacheError::NullArgument("key"))
        ));
    }

    #[test]
    fn test_missing_value_is_null_argument() {
        let req: SetRequest = serde_json::from_str(r#"{"key": "k"}"#).unwrap();
        assert!(matches!(
            req.into_parts(),
            Err(CacheError::NullArgument("value"))
        ));
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let req: SetRequest = serde_json::from_str(r#"{"key": "k", "value": ""}"#).unwrap();
        assert!(req.into_parts().is_ok());
    }
}
