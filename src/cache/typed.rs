//! Typed Access
//!
//! String and JSON conveniences layered over the byte-oriented cache.

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};

use crate::cache::policy::EntryOptions;
use crate::cache::DistributedCache;
use crate::error::{CacheError, Result};

impl DistributedCache {
    /// Reads a UTF-8 string.
    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| CacheError::Serialization(format!("Value is not UTF-8: {}", e))),
            None => Ok(None),
        }
    }

    /// Stores a UTF-8 string.
    pub async fn set_string(&self, key: &str, value: &str, options: &EntryOptions) -> Result<()> {
        self.set(key, value.as_bytes(), options).await
    }

    /// Reads a JSON-encoded value.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Stores `value` as JSON.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        options: &EntryOptions,
    ) -> Result<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set(key, &bytes, options).await
    }

    /// Returns the cached value, or computes, stores and returns it on a miss.
    ///
    /// Two concurrent misses may both run `fallback`; the last write wins.
    pub async fn get_or_set_json<T, F, Fut>(
        &self,
        key: &str,
        options: &EntryOptions,
        fallback: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get_json(key).await? {
            return Ok(cached);
        }

        let value = fallback().await?;
        self.set_json(key, &value, options).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde::Deserialize;

    use super::*;
    use crate::config::CacheOptions;
    use crate::store::MemoryRepository;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        visits: u32,
    }

    fn cache() -> DistributedCache {
        DistributedCache::new(&CacheOptions::default(), Arc::new(MemoryRepository::new())).unwrap()
    }

    #[tokio::test]
    async fn test_string_round_trip() {
        let cache = cache();
        cache
            .set_string("Key", "Value", &EntryOptions::new())
            .await
            .unwrap();

        assert_eq!(
            cache.get_string("Key").await.unwrap(),
            Some("Value".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_string_rejects_invalid_utf8() {
        let cache = cache();
        cache.set("k", &[0xff, 0xfe], &EntryOptions::new()).await.unwrap();

        assert!(matches!(
            cache.get_string("k").await,
            Err(CacheError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let cache = cache();
        let profile = Profile {
            name: "ada".to_string(),
            visits: 3,
        };

        cache
            .set_json("profile", &profile, &EntryOptions::new())
            .await
            .unwrap();

        assert_eq!(cache.get_json::<Profile>("profile").await.unwrap(), Some(profile));
        assert_eq!(cache.get_json::<Profile>("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_or_set_json_computes_once() {
        let cache = cache();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let value: u32 = cache
                .get_or_set_json("answer", &EntryOptions::new(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_set_json_propagates_fallback_error() {
        let cache = cache();

        let result: Result<u32> = cache
            .get_or_set_json("k", &EntryOptions::new(), || async {
                Err(CacheError::Store("origin down".to_string()))
            })
            .await;

        assert!(matches!(result, Err(CacheError::Store(_))));
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
