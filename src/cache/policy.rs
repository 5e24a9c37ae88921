//! Expiration Policy Module
//!
//! Pure functions deciding when an entry expires and how reads renew it.
//!
//! An entry carries a sliding window, an absolute deadline, or both:
//! - deadline only: `expires_at = deadline`, never moved by reads
//! - sliding only: `expires_at = now + window`, reset on every live read
//! - both: `expires_at = min(now + window, deadline)`

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == Entry Options ==
/// Expiration requested by a caller of `set`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOptions {
    /// Fixed deadline; must lie in the future
    pub absolute_expiration: Option<DateTime<Utc>>,
    /// Deadline expressed relative to the time of the write; wins over `absolute_expiration`
    pub absolute_expiration_relative_to_now: Option<Duration>,
    /// Renewal window
    pub sliding_expiration: Option<Duration>,
}

impl EntryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_absolute_expiration(mut self, at: DateTime<Utc>) -> Self {
        self.absolute_expiration = Some(at);
        self
    }

    pub fn with_absolute_expiration_relative_to_now(mut self, ttl: Duration) -> Self {
        self.absolute_expiration_relative_to_now = Some(ttl);
        self
    }

    pub fn with_sliding_expiration(mut self, window: Duration) -> Self {
        self.sliding_expiration = Some(window);
        self
    }

    /// True when no expiration field is set.
    pub fn is_empty(&self) -> bool {
        self.absolute_expiration.is_none()
            && self.absolute_expiration_relative_to_now.is_none()
            && self.sliding_expiration.is_none()
    }

    /// Replaces empty options with a sliding window of `default`.
    pub fn or_default_sliding(&self, default: Duration) -> Self {
        if self.is_empty() {
            Self::new().with_sliding_expiration(default)
        } else {
            self.clone()
        }
    }
}

// == Time Arithmetic ==
/// Adds a std duration to a timestamp, saturating at the far end of the calendar.
pub fn add_duration(at: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// == Absolute Deadline ==
/// Resolves the absolute deadline of a write made at `now`.
///
/// A relative duration takes precedence over a fixed timestamp. A zero
/// relative duration, or a fixed timestamp at or before `now`, is rejected.
pub fn compute_absolute_deadline(
    now: DateTime<Utc>,
    relative_to_now: Option<Duration>,
    absolute: Option<DateTime<Utc>>,
) -> Result<Option<DateTime<Utc>>> {
    if let Some(relative) = relative_to_now {
        if relative.is_zero() {
            return Err(CacheError::InvalidTemporalRange(
                "relative expiration must be positive".to_string(),
            ));
        }
        return Ok(Some(add_duration(now, relative)));
    }

    match absolute {
        Some(at) if at <= now => Err(CacheError::InvalidTemporalRange(
            "absolute expiration must be in the future".to_string(),
        )),
        other => Ok(other),
    }
}

// == Validate ==
/// Ensures an entry has at least one way to expire, and a non-zero window.
pub fn validate(sliding: Option<Duration>, deadline: Option<DateTime<Utc>>) -> Result<()> {
    if sliding.is_none() && deadline.is_none() {
        return Err(CacheError::MissingExpirationPolicy);
    }
    if sliding.is_some_and(|window| window.is_zero()) {
        return Err(CacheError::InvalidTemporalRange(
            "sliding expiration must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Checks the configured fallback sliding window.
pub fn validate_default_sliding(window: Duration) -> Result<()> {
    if window.is_zero() {
        return Err(CacheError::InvalidConfiguration(
            "the default sliding expiration must be positive".to_string(),
        ));
    }
    Ok(())
}

// == Initial Expiry ==
/// Expiry of a freshly written entry. Callers must have run [`validate`].
pub fn initial_expiry(
    now: DateTime<Utc>,
    sliding: Option<Duration>,
    deadline: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    match (sliding, deadline) {
        (Some(window), Some(deadline)) => add_duration(now, window).min(deadline),
        (Some(window), None) => add_duration(now, window),
        (None, Some(deadline)) => deadline,
        (None, None) => now,
    }
}

// == Renew On Access ==
/// Slides `entry.expires_at` forward for an access at `now`.
///
/// Returns `true` only when the expiry actually moved, so callers can skip
/// redundant writes. Stale entries and entries without a sliding window are
/// left untouched.
pub fn renew_on_access(entry: &mut CacheEntry, now: DateTime<Utc>) -> bool {
    let Some(window) = entry.sliding_expiration else {
        return false;
    };
    if now > entry.expires_at {
        return false;
    }

    let mut renewed = add_duration(now, window);
    if let Some(deadline) = entry.absolute_expiration {
        renewed = renewed.min(deadline);
    }

    if renewed == entry.expires_at {
        return false;
    }
    entry.expires_at = renewed;
    true
}
