//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{DistributedCache, EntryOptions};
use crate::config::{Backend, CacheOptions};
use crate::error::{CacheError, Result};
use crate::models::{GetResponse, HealthResponse, KeyResponse, SetRequest, StatsResponse};
use crate::store::{ElasticRepository, EntryRepository, MemoryRepository};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DistributedCache>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: DistributedCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Picks the repository named by `options.backend`. Must be called inside
    /// a tokio runtime.
    pub fn from_options(options: &CacheOptions) -> Result<Self> {
        let repository: Arc<dyn EntryRepository> = match options.backend {
            Backend::Memory => Arc::new(MemoryRepository::new()),
            Backend::Elastic => Arc::new(ElasticRepository::new(
                &options.elastic_url,
                options.index_name.clone(),
            )?),
        };
        Ok(Self::new(DistributedCache::new(options, repository)?))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<KeyResponse>> {
    let (key, value, options) = req.into_parts()?;
    state.cache.set_string(&key, &value, &options).await?;

    Ok(Json(KeyResponse::new(key, "set")))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get_string(&key).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for POST /refresh/:key
pub async fn refresh_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<KeyResponse>> {
    state.cache.refresh(&key).await?;

    Ok(Json(KeyResponse::new(key, "refreshed")))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<KeyResponse>> {
    state.cache.remove(&key).await?;

    Ok(Json(KeyResponse::new(key, "deleted")))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /
///
/// Writes `"Key" = "Value"` with the default policy and reads it back.
pub async fn demo_handler(State(state): State<AppState>) -> Result<Json<GetResponse>> {
    state
        .cache
        .set_string("Key", "Value", &EntryOptions::new())
        .await?;
    let value = state
        .cache
        .get_string("Key")
        .await?
        .ok_or_else(|| CacheError::NotFound("Key".to_string()))?;

    Ok(Json(GetResponse::new("Key", value)))
}
