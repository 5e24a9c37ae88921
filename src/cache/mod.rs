//! Cache Module
//!
//! Distributed caching with sliding and absolute expiration over a document store.

pub mod clock;
pub mod codec;
mod entry;
pub mod policy;
mod service;
mod stats;
mod typed;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::PayloadCodec;
pub use entry::CacheEntry;
pub use policy::EntryOptions;
pub use service::DistributedCache;
pub use stats::CacheStats;
