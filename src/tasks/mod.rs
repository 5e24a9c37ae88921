//! Background Tasks Module
//!
//! Contains work the cache runs outside of caller requests.
//!
//! # Tasks
//! - Expired entry sweep: purges stale documents store-wide, at most once per interval

mod sweep;

pub use sweep::{
    purge_expired, spawn_sweep_worker, SweepScheduler, DEFAULT_SWEEP_INTERVAL,
    SWEEP_INTERVAL_FLOOR,
};
