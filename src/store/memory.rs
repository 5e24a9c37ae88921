//! In-memory repository
//!
//! HashMap-backed `EntryRepository` used by the demo binary and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::cache::CacheEntry;
use crate::error::Result;
use crate::store::{EntryRepository, RefreshMode};

// == Memory Repository ==
#[derive(Debug, Default)]
pub struct MemoryRepository {
    /// Documents keyed by id
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored documents, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl EntryRepository for MemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn upsert(&self, entry: &CacheEntry, _refresh: RefreshMode) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at >= cutoff);
        Ok((before - entries.len()) as u64)
    }
}
