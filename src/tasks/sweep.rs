//! Expired Entry Sweep
//!
//! Cache operations piggyback a cheap check on every call. Once per interval
//! one caller wins an atomic claim on the interval and queues a purge for a
//! detached worker, which deletes every stale document from the store.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::EntryRepository;

/// Smallest accepted sweep interval.
pub const SWEEP_INTERVAL_FLOOR: Duration = Duration::from_secs(5 * 60);

/// Sweep interval used when none is configured.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

// == Sweep Scheduler ==
/// Decides when a sweep is due and hands it to the worker.
#[derive(Debug)]
pub struct SweepScheduler {
    /// Unix milliseconds of the last claimed sweep
    last_scan_ms: AtomicI64,
    interval_ms: i64,
    requests: mpsc::Sender<DateTime<Utc>>,
}

impl SweepScheduler {
    /// Creates a scheduler feeding `requests`.
    ///
    /// The first check after construction always triggers a sweep.
    pub fn new(interval: Duration, requests: mpsc::Sender<DateTime<Utc>>) -> Self {
        Self {
            last_scan_ms: AtomicI64::new(i64::MIN),
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            requests,
        }
    }

    /// Creates a scheduler together with its worker task.
    ///
    /// Must be called inside a tokio runtime. The worker stops once the
    /// scheduler is dropped.
    pub fn spawn(
        interval: Duration,
        repository: Arc<dyn EntryRepository>,
    ) -> (Self, JoinHandle<()>) {
        // A single slot: while one sweep is queued, further triggers are dropped
        let (sender, receiver) = mpsc::channel(1);
        let worker = spawn_sweep_worker(repository, receiver);
        (Self::new(interval, sender), worker)
    }

    // == Maybe Trigger Sweep ==
    /// Queues a sweep if more than one interval has passed since the last one.
    ///
    /// Returns `true` when this call launched the sweep. Concurrent callers
    /// race on a compare-and-swap, so at most one of them wins per interval.
    /// Never waits for the sweep itself.
    pub fn maybe_trigger_sweep(&self, now: DateTime<Utc>) -> bool {
        let now_ms = now.timestamp_millis();
        let last = self.last_scan_ms.load(Ordering::Acquire);

        if now_ms.saturating_sub(last) <= self.interval_ms {
            return false;
        }
        if self
            .last_scan_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        match self.requests.try_send(now) {
            Ok(()) => {
                debug!("Expired entry sweep queued at {}", now);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("Expired entry sweep already pending; skipping");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Sweep worker has stopped; expired entries will not be purged");
                false
            }
        }
    }
}

// == Purge Expired ==
/// Deletes every entry whose expiry lies before `now`.
pub async fn purge_expired(repository: &dyn EntryRepository, now: DateTime<Utc>) -> Result<u64> {
    repository.delete_expired(now).await
}

/// Spawns the worker that runs queued sweeps one at a time.
///
/// Failures are logged and dropped; a failed sweep is simply retried at the
/// next interval by whichever operation triggers it.
pub fn spawn_sweep_worker(
    repository: Arc<dyn EntryRepository>,
    mut requests: mpsc::Receiver<DateTime<Utc>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Expired entry sweep worker started");

        while let Some(now) = requests.recv().await {
            match purge_expired(repository.as_ref(), now).await {
                Ok(removed) if removed > 0 => {
                    info!("Sweep: removed {} expired entries", removed)
                }
                Ok(_) => debug!("Sweep: no expired entries found"),
                Err(e) => warn!("Sweep failed: {}", e),
            }
        }

        debug!("Expired entry sweep worker stopped");
    })
}
