//! Expiring Cache Module
//!
//! Thread-safe cache adding per-entry expiration on top of a bounded store.
//! Expiration is checked lazily when an entry is read; nothing runs in the
//! background.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, trace};

use crate::cache::clock::add_saturating;
use crate::cache::{
    BoundedStore, CacheEntry, CacheStats, Clock, EvictionPolicy, LruPolicy, SystemClock,
};
use crate::config::CacheConfig;

// == Expiring Cache ==
/// In-memory key/value cache whose entries disappear once their expiration
/// instant has passed.
///
/// A miss never says why: the key may never have been stored, may have
/// expired, or may have been dropped by the store for capacity or memory
/// pressure. Callers should treat every `None` as "recompute or refetch".
///
/// Values are kept behind [`Arc`] and handed out as `Arc<V>`, so the cache
/// never clones or inspects them.
///
/// # Example
/// ```
/// use expiring_cache::ExpiringCache;
///
/// let cache: ExpiringCache<String, Vec<u8>> = ExpiringCache::new();
/// cache.set("avatar".to_string(), Some(vec![1, 2, 3]));
///
/// assert_eq!(cache.get("avatar").as_deref(), Some(&vec![1, 2, 3]));
/// assert!(cache.remove("avatar").is_some());
/// assert!(cache.get("avatar").is_none());
/// ```
#[derive(Debug)]
pub struct ExpiringCache<K, V> {
    /// Store and counters, guarded together
    inner: Mutex<Inner<K, V>>,
    /// Source of "now" for expiration checks
    clock: Arc<dyn Clock>,
    /// TTL for writes without an explicit expiration
    default_ttl: Duration,
}

#[derive(Debug)]
struct Inner<K, V> {
    store: BoundedStore<K, V>,
    stats: CacheStats,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Send + Debug + 'static,
{
    // == Constructors ==
    /// Creates an unbounded cache with the default TTL of 180 seconds.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache from configuration, using the system clock.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`, with LRU eviction.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(config, clock, Box::new(LruPolicy::new()))
    }
}

impl<K, V> Default for ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Send + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache with a custom eviction policy.
    pub fn with_policy(
        config: CacheConfig,
        clock: Arc<dyn Clock>,
        policy: Box<dyn EvictionPolicy<K>>,
    ) -> Self {
        debug!(
            "Creating expiring cache: default_ttl={:?}, max_entries={:?}",
            config.default_ttl, config.max_entries
        );

        Self {
            inner: Mutex::new(Inner {
                store: BoundedStore::new(config.max_entries, policy),
                stats: CacheStats::new(),
            }),
            clock,
            default_ttl: config.default_ttl,
        }
    }

    // == Get ==
    /// Returns the value stored under `key` if it exists and has not expired.
    ///
    /// An expired entry found here is removed from the store before returning None.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.lock();
        let Inner { store, stats } = &mut *inner;
        let now = self.clock.now();

        let Some(entry) = store.peek(key) else {
            stats.record_miss();
            return None;
        };

        if entry.is_expired(now) {
            store.remove(key);
            stats.record_expiration();
            stats.record_miss();
            debug!("Discarded expired entry on read");
            return None;
        }

        stats.record_hit();
        store.get(key).map(|entry| Arc::clone(&entry.value))
    }

    // == Set With Expiration ==
    /// Stores `value` under `key`, replacing whatever was there.
    ///
    /// The entry expires at `expires_at`, or after the default TTL when None.
    /// An instant already in the past is accepted and the entry reads as
    /// absent from then on. Writing `None` removes the key instead.
    pub fn set_expiring(&self, key: K, value: Option<V>, expires_at: Option<DateTime<Utc>>) {
        let Some(value) = value else {
            self.remove(&key);
            return;
        };

        let mut inner = self.lock();
        let expires_at =
            expires_at.unwrap_or_else(|| add_saturating(self.clock.now(), self.default_ttl));

        let evicted = inner
            .store
            .insert(key, CacheEntry::new(Arc::new(value), expires_at));
        if evicted > 0 {
            inner.stats.record_evictions(evicted);
            debug!("Evicted {} entries to stay within capacity", evicted);
        }

        trace!("Stored entry expiring at {}", expires_at);
    }

    // == Set ==
    /// Stores `value` under `key` with the default TTL; `None` removes the key.
    pub fn set(&self, key: K, value: Option<V>) {
        self.set_expiring(key, value, None);
    }

    // == Remove ==
    /// Removes the entry under `key` and returns its value.
    ///
    /// Freshness is not checked: an expired entry that is still stored is
    /// returned as well.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.lock().store.remove(key);
        if removed.is_some() {
            trace!("Removed entry");
        }
        removed.map(|entry| entry.value)
    }

    // == Remove All ==
    /// Drops every entry, expired or not.
    pub fn remove_all(&self) {
        let cleared = self.lock().store.clear();
        info!("Cache cleared: removed {} entries", cleared);
    }

    // == Slot ==
    /// Read/write accessor for a single key.
    ///
    /// Reading behaves like [`get`](Self::get); writing behaves like
    /// [`set`](Self::set) and always uses the default TTL.
    pub fn slot(&self, key: K) -> CacheSlot<'_, K, V> {
        CacheSlot { cache: self, key }
    }

    // == Relieve Pressure ==
    /// Asks the store to drop up to `count` entries chosen by its eviction policy,
    /// as it would under memory pressure.
    ///
    /// Returns the number of entries dropped.
    pub fn relieve_pressure(&self, count: usize) -> usize {
        let mut inner = self.lock();
        let evicted = inner.store.evict(count);
        inner.stats.record_evictions(evicted);
        info!(
            "Memory pressure: evicted {} of {} requested entries, {} remain",
            evicted,
            count,
            inner.store.len()
        );
        evicted
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    // == Default TTL ==
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned guard is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn stored_len(&self) -> usize {
        self.lock().store.len()
    }
}

// == Cache Slot ==
/// A key bound to its cache, returned by [`ExpiringCache::slot`].
#[derive(Debug)]
pub struct CacheSlot<'a, K, V> {
    cache: &'a ExpiringCache<K, V>,
    key: K,
}

impl<'a, K, V> CacheSlot<'a, K, V>
where
    K: Eq + Hash,
{
    /// Reads the slot; same as [`ExpiringCache::get`].
    pub fn get(&self) -> Option<Arc<V>> {
        self.cache.get(&self.key)
    }

    /// Writes the slot with the default TTL; `None` removes the key.
    pub fn set(self, value: Option<V>) {
        self.cache.set(self.key, value);
    }

    pub fn key(&self) -> &K {
        &self.key
    }
}
