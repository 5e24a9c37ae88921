//! Cache Entry Module
//!
//! Defines the document persisted for every cache key.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A single cache document as stored in the repository.
///
/// `expires_at` is always set; it is the only field consulted by lazy
/// expiration and by the background sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The key, used verbatim as the document id
    pub id: String,
    /// Encoded payload (see `PayloadCodec`)
    pub value: String,
    /// Instant after which the entry is stale
    #[serde(rename = "expiresAtTime")]
    pub expires_at: DateTime<Utc>,
    /// Renewal window applied on every successful access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sliding_expiration: Option<Duration>,
    /// Hard deadline `expires_at` may never pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_expiration: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Is Expired ==
    /// Checks whether the entry is stale at `now`.
    ///
    /// An entry is still live at the exact instant of `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    // == Time To Live ==
    /// Returns the time left before the entry goes stale, zero once it has.
    pub fn ttl_remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}
