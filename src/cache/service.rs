//! Distributed Cache Service
//!
//! Runs get/set/refresh/remove against the repository, applying the
//! expiration policy on the way in and out. Every operation ends with a
//! sweep check, so store-wide cleanup piggybacks on regular traffic.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::codec::PayloadCodec;
use crate::cache::policy::{self, EntryOptions};
use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats};
use crate::config::CacheOptions;
use crate::error::{CacheError, Result};
use crate::store::{EntryRepository, RefreshMode};
use crate::tasks::SweepScheduler;

// == Distributed Cache ==
/// Cache of byte payloads with sliding and absolute expiration.
pub struct DistributedCache {
    repository: Arc<dyn EntryRepository>,
    clock: Arc<dyn Clock>,
    codec: PayloadCodec,
    default_sliding_expiration: Duration,
    refresh: RefreshMode,
    sweeper: SweepScheduler,
    sweep_worker: JoinHandle<()>,
    stats: StatsRecorder,
}

impl DistributedCache {
    // == Constructor ==
    /// Creates a cache over `repository` using the system clock.
    ///
    /// Starts the sweep worker, so it fails with `InvalidConfiguration`
    /// outside a tokio runtime.
    pub fn new(options: &CacheOptions, repository: Arc<dyn EntryRepository>) -> Result<Self> {
        Self::with_clock(options, repository, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(
        options: &CacheOptions,
        repository: Arc<dyn EntryRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        options.validate()?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::InvalidConfiguration(
                "the cache must be created inside a tokio runtime".to_string(),
            ));
        }

        let (sweeper, sweep_worker) =
            SweepScheduler::spawn(options.sweep_interval, repository.clone());

        Ok(Self {
            repository,
            clock,
            codec: PayloadCodec::new(options.compress, options.min_compress_length),
            default_sliding_expiration: options.default_sliding_expiration,
            refresh: options.refresh,
            sweeper,
            sweep_worker,
            stats: StatsRecorder::default(),
        })
    }

    // == Get ==
    /// Returns the payload stored under `key`, or `None` if absent or stale.
    ///
    /// A live entry with a sliding window is renewed before returning.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.get_cancellable(key, &CancellationToken::new()).await
    }

    pub async fn get_cancellable(
        &self,
        key: &str,
        token: &CancellationToken,
    ) -> Result<Option<Vec<u8>>> {
        check_key(key)?;
        let entry = self.fetch_live(key, token).await?;

        self.maybe_trigger_sweep();

        match entry {
            Some(entry) => {
                self.stats.record_hit();
                self.codec.decode(&entry.value).map(Some)
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and its expiration.
    ///
    /// Empty `options` fall back to the default sliding window. An absolute
    /// expiration that is not in the future is rejected before anything is written.
    pub async fn set(&self, key: &str, value: &[u8], options: &EntryOptions) -> Result<()> {
        self.set_cancellable(key, value, options, &CancellationToken::new())
            .await
    }

    pub async fn set_cancellable(
        &self,
        key: &str,
        value: &[u8],
        options: &EntryOptions,
        token: &CancellationToken,
    ) -> Result<()> {
        check_key(key)?;
        check_cancelled(token)?;

        let entry = self.create_entry(key, value, options)?;
        check_cancelled(token)?;
        self.repository.upsert(&entry, self.refresh).await?;
        self.stats.record_write();
        debug!("Stored '{}' until {}", key, entry.expires_at);

        self.maybe_trigger_sweep();
        Ok(())
    }

    // == Refresh ==
    /// Renews the sliding window of `key` without reading its payload.
    ///
    /// Absent or stale keys are ignored.
    pub async fn refresh(&self, key: &str) -> Result<()> {
        self.refresh_cancellable(key, &CancellationToken::new())
            .await
    }

    pub async fn refresh_cancellable(&self, key: &str, token: &CancellationToken) -> Result<()> {
        check_key(key)?;
        self.fetch_live(key, token).await?;

        self.maybe_trigger_sweep();
        Ok(())
    }

    // == Remove ==
    /// Deletes `key`. Removing an absent key succeeds.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.remove_cancellable(key, &CancellationToken::new())
            .await
    }

    pub async fn remove_cancellable(&self, key: &str, token: &CancellationToken) -> Result<()> {
        check_key(key)?;
        check_cancelled(token)?;

        self.repository.delete(key).await?;
        self.stats.record_removal();

        self.maybe_trigger_sweep();
        Ok(())
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Stops the sweep worker, abandoning any queued or running sweep.
    ///
    /// Dropping the cache instead lets a running sweep finish.
    pub fn shutdown(&self) {
        self.sweep_worker.abort();
    }

    /// Loads `key`, hides it if stale, and persists a sliding renewal.
    ///
    /// Stale documents are left in place for the sweep to reclaim.
    async fn fetch_live(&self, key: &str, token: &CancellationToken) -> Result<Option<CacheEntry>> {
        check_cancelled(token)?;
        let Some(mut entry) = self.repository.get(key).await? else {
            return Ok(None);
        };

        let now = self.clock.now();
        if entry.is_expired_at(now) {
            debug!("'{}' expired at {}; treating as absent", key, entry.expires_at);
            return Ok(None);
        }

        if policy::renew_on_access(&mut entry, now) {
            check_cancelled(token)?;
            self.repository.upsert(&entry, self.refresh).await?;
            debug!("Renewed '{}' until {}", key, entry.expires_at);
        }
        Ok(Some(entry))
    }

    fn create_entry(&self, key: &str, value: &[u8], options: &EntryOptions) -> Result<CacheEntry> {
        let options = options.or_default_sliding(self.default_sliding_expiration);
        let now = self.clock.now();

        let deadline = policy::compute_absolute_deadline(
            now,
            options.absolute_expiration_relative_to_now,
            options.absolute_expiration,
        )?;
        policy::validate(options.sliding_expiration, deadline)?;

        Ok(CacheEntry {
            id: key.to_string(),
            value: self.codec.encode(value)?,
            expires_at: policy::initial_expiry(now, options.sliding_expiration, deadline),
            sliding_expiration: options.sliding_expiration,
            absolute_expiration: deadline,
        })
    }

    fn maybe_trigger_sweep(&self) {
        if self.sweeper.maybe_trigger_sweep(self.now()) {
            self.stats.record_sweep();
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::NullArgument("key"));
    }
    Ok(())
}

fn check_cancelled(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        return Err(CacheError::Cancelled);
    }
    Ok(())
}
