//! Expiring Cache - A generic in-memory key/value cache
//!
//! Entries carry an expiration instant and read as absent once it has passed.
//! Expiration is checked lazily on read; the backing store may additionally
//! drop entries for capacity or memory pressure, which callers observe as an
//! ordinary miss.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{
    CacheSlot, CacheStats, Clock, EvictionPolicy, ExpiringCache, LruPolicy, ManualClock,
    SystemClock, DEFAULT_TTL,
};
pub use config::CacheConfig;
pub use error::ConfigError;
