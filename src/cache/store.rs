//! Bounded Store Module
//!
//! HashMap storage with an optional entry limit and a pluggable eviction policy.
//! The store knows nothing about expiration; it may drop any entry whenever it
//! needs room or is asked to shed load.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::{CacheEntry, EvictionPolicy};

// == Bounded Store ==
/// Capacity-bounded associative container backing an expiring cache.
#[derive(Debug)]
pub struct BoundedStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Victim selection
    policy: Box<dyn EvictionPolicy<K>>,
    /// Maximum number of entries, None = unbounded
    max_entries: Option<usize>,
}

impl<K, V> BoundedStore<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates a new store.
    ///
    /// # Arguments
    /// * `max_entries` - Entry limit; `None` or `Some(0)` means unbounded
    /// * `policy` - Decides which key goes when room is needed
    pub fn new(max_entries: Option<usize>, policy: Box<dyn EvictionPolicy<K>>) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            max_entries: max_entries.filter(|&max| max > 0),
        }
    }

    // == Insert ==
    /// Stores or replaces an entry.
    ///
    /// Replacing an existing key never evicts. Inserting a new key into a full
    /// store first drops policy victims until there is room.
    ///
    /// Returns the number of entries evicted to make room.
    pub fn insert(&mut self, key: K, entry: CacheEntry<V>) -> usize {
        let mut evicted = 0;

        if let Some(max) = self.max_entries {
            if !self.entries.contains_key(&key) {
                while self.entries.len() >= max {
                    if self.evict_one().is_none() {
                        // Policy has nothing left to offer; growing past the
                        // limit beats refusing the write.
                        break;
                    }
                    evicted += 1;
                }
            }
        }

        self.policy.record_insert(&key);
        self.entries.insert(key, entry);
        evicted
    }

    // == Peek ==
    /// Looks up an entry without informing the eviction policy.
    pub fn peek<Q>(&self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    // == Get ==
    /// Looks up an entry and records the access with the eviction policy.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (stored_key, entry) = self.entries.get_key_value(key)?;
        self.policy.record_access(stored_key);
        Some(entry)
    }

    // == Remove ==
    /// Removes an entry regardless of its state and returns it.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (stored_key, entry) = self.entries.remove_entry(key)?;
        self.policy.record_remove(&stored_key);
        Some(entry)
    }

    // == Clear ==
    /// Drops every entry. Returns how many were stored.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.policy.clear();
        count
    }

    // == Evict ==
    /// Drops up to `count` entries chosen by the eviction policy.
    ///
    /// Returns the number of entries actually dropped.
    pub fn evict(&mut self, count: usize) -> usize {
        let mut evicted = 0;
        while evicted < count && self.evict_one().is_some() {
            evicted += 1;
        }
        evicted
    }

    fn evict_one(&mut self) -> Option<CacheEntry<V>> {
        // Skip victims the policy still tracks but the map no longer holds.
        loop {
            let victim = self.policy.victim()?;
            if let Some(entry) = self.entries.remove(&victim) {
                return Some(entry);
            }
        }
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
