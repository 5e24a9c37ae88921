//! Elastic Cache - A distributed cache over a document store
//!
//! Stores byte payloads with sliding and absolute expiration, hides stale
//! entries on read and purges them store-wide in the background.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{DistributedCache, EntryOptions};
pub use config::CacheOptions;
pub use error::{CacheError, Result};
