//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::policy::validate_default_sliding;
use crate::error::{CacheError, Result};
use crate::store::RefreshMode;
use crate::tasks::{DEFAULT_SWEEP_INTERVAL, SWEEP_INTERVAL_FLOOR};

/// Default sliding window applied when a write carries no expiration.
pub const DEFAULT_SLIDING_EXPIRATION: Duration = Duration::from_secs(20 * 60);

/// Which repository the binary wires the cache to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Process-local map, for demos and tests
    Memory,
    /// Elasticsearch document API
    Elastic,
}

impl Backend {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Some(Backend::Memory),
            "elastic" | "elasticsearch" => Some(Backend::Elastic),
            _ => None,
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Call [`CacheOptions::validate`] before building a cache from them.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Base URL of the document store
    pub elastic_url: String,
    /// Index holding the cache documents
    pub index_name: String,
    /// Sliding window used when a write supplies no expiration
    pub default_sliding_expiration: Duration,
    /// Minimum time between two background sweeps
    pub sweep_interval: Duration,
    /// Gzip payloads before storing them
    pub compress: bool,
    /// Payloads shorter than this are never compressed
    pub min_compress_length: usize,
    /// Visibility of writes to subsequent searches
    pub refresh: RefreshMode,
    /// Repository backing the binary
    pub backend: Backend,
    /// HTTP server port of the demo binary
    pub server_port: u16,
}

impl CacheOptions {
    /// Creates a new CacheOptions by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ELASTIC_URL` - Document store URL (default: http://localhost:9200)
    /// - `CACHE_INDEX` - Index name (default: cache)
    /// - `DEFAULT_SLIDING_SECS` - Default sliding window in seconds (default: 1200)
    /// - `SWEEP_INTERVAL_SECS` - Sweep interval in seconds (default: 1800, min: 300)
    /// - `CACHE_COMPRESS` - Enable payload compression (default: false)
    /// - `CACHE_COMPRESS_MIN_LENGTH` - Compression threshold in bytes (default: 1024)
    /// - `CACHE_REFRESH` - `immediate`, `wait_for` or `none` (default: none)
    /// - `CACHE_BACKEND` - `memory` or `elastic` (default: memory)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            elastic_url: env::var("ELASTIC_URL").unwrap_or(defaults.elastic_url),
            index_name: env::var("CACHE_INDEX").unwrap_or(defaults.index_name),
            default_sliding_expiration: env::var("DEFAULT_SLIDING_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_sliding_expiration),
            sweep_interval: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            compress: env::var("CACHE_COMPRESS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.compress),
            min_compress_length: env::var("CACHE_COMPRESS_MIN_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_compress_length),
            refresh: env::var("CACHE_REFRESH")
                .ok()
                .and_then(|v| RefreshMode::parse(&v))
                .unwrap_or(defaults.refresh),
            backend: env::var("CACHE_BACKEND")
                .ok()
                .and_then(|v| Backend::parse(&v))
                .unwrap_or(defaults.backend),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Rejects options the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.elastic_url.trim().is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "elastic_url cannot be empty".to_string(),
            ));
        }
        if self.index_name.is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "index_name cannot be empty".to_string(),
            ));
        }
        if self.sweep_interval < SWEEP_INTERVAL_FLOOR {
            return Err(CacheError::InvalidConfiguration(format!(
                "sweep_interval cannot be less than the minimum value of {} minutes",
                SWEEP_INTERVAL_FLOOR.as_secs() / 60
            )));
        }
        validate_default_sliding(self.default_sliding_expiration)
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            elastic_url: "http://localhost:9200".to_string(),
            index_name: "cache".to_string(),
            default_sliding_expiration: DEFAULT_SLIDING_EXPIRATION,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            compress: false,
            min_compress_length: 1024,
            refresh: RefreshMode::None,
            backend: Backend::Memory,
            server_port: 3000,
        }
    }
}
