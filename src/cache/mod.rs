//! Cache Module
//!
//! Provides an in-memory cache with lazy per-entry expiration over a bounded
//! store with pluggable eviction.

mod clock;
mod entry;
mod expiring;
mod policy;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub(crate) use entry::CacheEntry;
pub use expiring::{CacheSlot, ExpiringCache};
pub use policy::{EvictionPolicy, LruPolicy};
pub use stats::CacheStats;
pub(crate) use store::BoundedStore;

use std::time::Duration;

// == Public Constants ==
/// TTL applied to writes that carry no explicit expiration
pub const DEFAULT_TTL: Duration = Duration::from_secs(180);
