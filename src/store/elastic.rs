//! Elasticsearch repository
//!
//! Stores cache entries as documents of a single index through the REST
//! document API. The cache key is the document id, percent-encoded as one
//! path segment and otherwise sent verbatim.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};
use crate::store::{EntryRepository, RefreshMode};

/// Repository backed by an Elasticsearch index.
#[derive(Debug, Clone)]
pub struct ElasticRepository {
    client: reqwest::Client,
    base_url: Url,
    index: String,
}

#[derive(Debug, Deserialize)]
struct GetDocumentResponse {
    found: bool,
    #[serde(rename = "_source")]
    source: Option<CacheEntry>,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    deleted: u64,
}

impl ElasticRepository {
    /// Creates a repository for `index` on the cluster at `base_url`.
    pub fn new(base_url: &str, index: impl Into<String>) -> Result<Self> {
        let index = index.into();
        if index.is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "index_name cannot be empty".to_string(),
            ));
        }

        let base_url = Url::parse(base_url).map_err(|e| {
            CacheError::InvalidConfiguration(format!("Invalid elastic_url '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::InvalidConfiguration(format!(
                "elastic_url '{}' cannot be used as a base URL",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CacheError::Store(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            index,
        })
    }

    /// Builds `{base}/{index}/{segments..}` with every segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(&self.index).extend(segments);
        }
        url
    }

    fn document_url(&self, key: &str) -> Url {
        self.url(&["_doc", key])
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(CacheError::Store(format!(
            "{} failed with status {}: {}",
            action, status, error_text
        )))
    }
}

fn transport_error(action: &str, e: reqwest::Error) -> CacheError {
    CacheError::Store(format!("{} request failed: {}", action, e))
}

#[async_trait]
impl EntryRepository for ElasticRepository {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let response = self
            .client
            .get(self.document_url(key))
            .send()
            .await
            .map_err(|e| transport_error("Get", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: GetDocumentResponse = Self::check(response, "Get")
            .await?
            .json()
            .await
            .map_err(|e| CacheError::Store(format!("Failed to parse document: {}", e)))?;

        Ok(if document.found { document.source } else { None })
    }

    async fn upsert(&self, entry: &CacheEntry, refresh: RefreshMode) -> Result<()> {
        let response = self
            .client
            .put(self.document_url(&entry.id))
            .query(&[("refresh", refresh.as_query_value())])
            .json(entry)
            .send()
            .await
            .map_err(|e| transport_error("Index", e))?;

        Self::check(response, "Index").await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.document_url(key))
            .send()
            .await
            .map_err(|e| transport_error("Delete", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Delete of absent document '{}' ignored", key);
            return Ok(());
        }
        Self::check(response, "Delete").await?;
        Ok(())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let body = json!({
            "query": {
                "range": {
                    "expiresAtTime": {
                        "lt": cutoff.to_rfc3339_opts(SecondsFormat::Millis, true)
                    }
                }
            }
        });

        let response = self
            .client
            .post(self.url(&["_delete_by_query"]))
            .query(&[("conflicts", "proceed")])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Delete by query", e))?;

        let result: DeleteByQueryResponse = Self::check(response, "Delete by query")
            .await?
            .json()
            .await
            .map_err(|e| CacheError::Store(format!("Failed to parse response: {}", e)))?;

        Ok(result.deleted)
    }
}
