//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an expiration instant.

use std::sync::Arc;

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A stored value together with the instant after which it is considered absent.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value, shared with callers that read it
    pub value: Arc<V>,
    /// Absolute expiration instant
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry expiring at `expires_at`.
    ///
    /// An instant in the past is accepted; the entry is simply born expired.
    pub fn new(value: Arc<V>, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired when `now >= expires_at`, so a
    /// read at exactly the expiration instant already misses.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
