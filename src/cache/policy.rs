//! Eviction Policy Module
//!
//! Decides which entry a bounded store drops when it needs room or is under
//! memory pressure.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

// == Eviction Policy Trait ==
/// Pluggable victim selection for the store behind an
/// [`ExpiringCache`](super::ExpiringCache).
///
/// The store reports every insert, read hit and removal; the policy only has
/// to answer which key should go next. Every call happens under the cache
/// lock, so implementations should stay well below linear time per call.
pub trait EvictionPolicy<K>: Send + Debug {
    /// A key was inserted or replaced.
    fn record_insert(&mut self, key: &K);

    /// A key was read successfully.
    fn record_access(&mut self, key: &K);

    /// A key left the store for any reason.
    fn record_remove(&mut self, key: &K);

    /// Every key left the store.
    fn clear(&mut self);

    /// Picks and forgets the next key to evict. Returns None if nothing is tracked.
    fn victim(&mut self) -> Option<K>;
}

// == LRU Policy ==
/// Least recently used ordering in O(log n) per operation.
///
/// Each use stamps the key with a fresh tick. `order` maps ticks back to keys,
/// so its first entry is always the least recently used key.
#[derive(Debug)]
pub struct LruPolicy<K> {
    /// Last-use tick per key
    ticks: HashMap<K, u64>,
    /// Keys by last-use tick, oldest first
    order: BTreeMap<u64, K>,
    /// Tick handed to the next use
    next_tick: u64,
}

impl<K> LruPolicy<K> {
    // == Constructor ==
    /// Creates a new empty LRU policy.
    pub fn new() -> Self {
        Self {
            ticks: HashMap::new(),
            order: BTreeMap::new(),
            next_tick: 0,
        }
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<K> Default for LruPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone + Send + Debug> LruPolicy<K> {
    // == Touch ==
    /// Marks a key as most recently used.
    fn touch(&mut self, key: &K) {
        let tick = self.next_tick;
        self.next_tick += 1;

        if let Some(previous) = self.ticks.insert(key.clone(), tick) {
            self.order.remove(&previous);
        }
        self.order.insert(tick, key.clone());
    }

    fn forget(&mut self, key: &K) {
        if let Some(previous) = self.ticks.remove(key) {
            self.order.remove(&previous);
        }
    }
}

impl<K: Eq + Hash + Clone + Send + Debug> EvictionPolicy<K> for LruPolicy<K> {
    fn record_insert(&mut self, key: &K) {
        self.touch(key);
    }

    fn record_access(&mut self, key: &K) {
        self.touch(key);
    }

    fn record_remove(&mut self, key: &K) {
        self.forget(key);
    }

    fn clear(&mut self) {
        self.ticks.clear();
        self.order.clear();
    }

    fn victim(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }
}
