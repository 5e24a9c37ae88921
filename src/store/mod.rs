//! Store Module
//!
//! The document repository the cache persists entries in.
//!
//! # Backends
//! - `MemoryRepository`: process-local map
//! - `ElasticRepository`: Elasticsearch document API over HTTP

mod elastic;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;
use crate::error::Result;

pub use elastic::ElasticRepository;
pub use memory::MemoryRepository;

/// When a write becomes visible to searches such as the expiry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Refresh affected shards right away
    Immediate,
    /// Wait for the next scheduled refresh before returning
    WaitFor,
    /// Leave refreshes to the store
    #[default]
    None,
}

impl RefreshMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "immediate" => Some(RefreshMode::Immediate),
            "wait_for" | "deferred" => Some(RefreshMode::WaitFor),
            "false" | "none" => Some(RefreshMode::None),
            _ => None,
        }
    }

    /// Value of the `refresh` query parameter.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            RefreshMode::Immediate => "true",
            RefreshMode::WaitFor => "wait_for",
            RefreshMode::None => "false",
        }
    }
}

/// Keyed document storage with a range delete on expiry.
///
/// Implementations must give last-write-wins, read-after-write consistency
/// per key. No cross-key guarantees are needed.
#[async_trait]
pub trait EntryRepository: Send + Sync + 'static {
    /// Fetches the document stored under `key`, stale or not.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts or fully replaces the document for `entry.id`.
    async fn upsert(&self, entry: &CacheEntry, refresh: RefreshMode) -> Result<()>;

    /// Deletes the document for `key`; deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes every document with `expires_at < cutoff` and returns how many went.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
