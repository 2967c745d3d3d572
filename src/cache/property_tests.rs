//! Property-Based Tests for Cache Module
//!
//! Uses proptest with a manual clock, so expiration is exercised without sleeping.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::cache::{Clock, ExpiringCache, ManualClock};
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(180);

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
}

fn test_cache(config: CacheConfig) -> (ExpiringCache<String, String>, ManualClock) {
    let clock = ManualClock::new(epoch());
    let cache = ExpiringCache::with_clock(config, Arc::new(clock.clone()));
    (cache, clock)
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}".prop_map(|s| s)
}

/// Cache operations, with times in milliseconds relative to the current clock
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    SetExpiring { key: String, value: String, ttl_ms: i64 },
    SetNone { key: String },
    Get { key: String },
    Remove { key: String },
    RemoveAll,
    Advance { ms: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => (key_strategy(), value_strategy(), -500i64..5_000)
            .prop_map(|(key, value, ttl_ms)| CacheOp::SetExpiring { key, value, ttl_ms }),
        1 => key_strategy().prop_map(|key| CacheOp::SetNone { key }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => Just(CacheOp::RemoveAll),
        2 => (0u64..3_000).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Storing a value and reading it back before it expires returns the same value.
    #[test]
    fn prop_set_then_get(key in key_strategy(), value in value_strategy()) {
        let (cache, _clock) = test_cache(CacheConfig::default());

        cache.set(key.clone(), Some(value.clone()));

        let got = cache.get(&key);
        prop_assert_eq!(got.as_deref(), Some(&value));
    }

    // An entry is visible strictly before its expiration instant and gone at or after it.
    #[test]
    fn prop_expiration_instant(
        key in key_strategy(),
        value in value_strategy(),
        lifetime_ms in 1i64..10_000,
        read_ms in 0i64..20_000
    ) {
        let (cache, clock) = test_cache(CacheConfig::default());
        let deadline = epoch() + chrono::Duration::milliseconds(lifetime_ms);

        cache.set_expiring(key.clone(), Some(value.clone()), Some(deadline));
        clock.set(epoch() + chrono::Duration::milliseconds(read_ms));

        if read_ms < lifetime_ms {
            let got = cache.get(&key);
            prop_assert_eq!(got.as_deref(), Some(&value));
            let got = cache.remove(&key);
            prop_assert_eq!(got.as_deref(), Some(&value));
        } else {
            prop_assert!(cache.get(&key).is_none());
            // The expired read already dropped it from the store
            prop_assert!(cache.remove(&key).is_none());
        }
    }

    // Remove hands back the last stored value exactly once, fresh or expired.
    #[test]
    fn prop_remove_returns_last_value_once(
        key in key_strategy(),
        values in prop::collection::vec(value_strategy(), 1..5),
        elapsed_ms in 0u64..400_000
    ) {
        let (cache, clock) = test_cache(CacheConfig::default());
        for value in &values {
            cache.set(key.clone(), Some(value.clone()));
        }
        clock.advance(Duration::from_millis(elapsed_ms));

        let got = cache.remove(&key);
        prop_assert_eq!(got.as_deref(), values.last());
        prop_assert!(cache.remove(&key).is_none());
    }

    // Writing None is observably the same as remove.
    #[test]
    fn prop_set_none_matches_remove(key in key_strategy(), value in value_strategy()) {
        let (by_remove, _c1) = test_cache(CacheConfig::default());
        let (by_none, _c2) = test_cache(CacheConfig::default());

        by_remove.set(key.clone(), Some(value.clone()));
        by_none.set(key.clone(), Some(value));

        by_remove.remove(&key);
        by_none.set(key.clone(), None);

        prop_assert!(by_remove.get(&key).is_none());
        prop_assert!(by_none.get(&key).is_none());
        prop_assert!(by_none.remove(&key).is_none());
    }

    // Remove all empties the cache whatever the expiration state of each entry.
    #[test]
    fn prop_remove_all_clears_everything(
        entries in prop::collection::vec((key_strategy(), value_strategy(), -1_000i64..1_000), 1..20),
        elapsed_ms in 0u64..2_000
    ) {
        let (cache, clock) = test_cache(CacheConfig::default());
        for (key, value, ttl_ms) in &entries {
            let deadline = epoch() + chrono::Duration::milliseconds(*ttl_ms);
            cache.set_expiring(key.clone(), Some(value.clone()), Some(deadline));
        }
        clock.advance(Duration::from_millis(elapsed_ms));

        cache.remove_all();

        prop_assert_eq!(cache.stored_len(), 0);
        for (key, _, _) in &entries {
            prop_assert!(cache.get(key).is_none());
        }
    }

    // Back-to-back reads of a fresh entry agree and leave it in place.
    #[test]
    fn prop_get_is_idempotent(key in key_strategy(), value in value_strategy()) {
        let (cache, _clock) = test_cache(CacheConfig::default());
        cache.set(key.clone(), Some(value));

        let first = cache.get(&key);
        let second = cache.get(&key);

        prop_assert_eq!(first, second);
        prop_assert_eq!(cache.stored_len(), 1);
    }

    // An unbounded cache behaves exactly like a map of (value, deadline) pairs
    // with read-time eviction.
    #[test]
    fn prop_matches_reference_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (cache, clock) = test_cache(CacheConfig::default());
        let mut model: HashMap<String, (String, DateTime<Utc>)> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            let now = clock.now();
            match op {
                CacheOp::Set { key, value } => {
                    let deadline = now + chrono::Duration::from_std(TEST_DEFAULT_TTL).unwrap();
                    cache.set(key.clone(), Some(value.clone()));
                    model.insert(key, (value, deadline));
                }
                CacheOp::SetExpiring { key, value, ttl_ms } => {
                    let deadline = now + chrono::Duration::milliseconds(ttl_ms);
                    cache.set_expiring(key.clone(), Some(value.clone()), Some(deadline));
                    model.insert(key, (value, deadline));
                }
                CacheOp::SetNone { key } => {
                    cache.set(key.clone(), None);
                    model.remove(&key);
                }
                CacheOp::Get { key } => {
                    let stored = model.get(&key).cloned();
                    let expected = match stored {
                        Some((value, deadline)) if now < deadline => Some(value),
                        Some(_) => {
                            model.remove(&key);
                            None
                        }
                        None => None,
                    };
                    match &expected {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                    let got = cache.get(&key);
                    prop_assert_eq!(got.as_deref(), expected.as_ref());
                }
                CacheOp::Remove { key } => {
                    let expected = model.remove(&key).map(|(value, _)| value);
                    let got = cache.remove(&key);
                    prop_assert_eq!(got.as_deref(), expected.as_ref());
                }
                CacheOp::RemoveAll => {
                    cache.remove_all();
                    model.clear();
                }
                CacheOp::Advance { ms } => clock.advance(Duration::from_millis(ms)),
            }
            prop_assert_eq!(cache.stored_len(), model.len());
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.evictions, 0);
    }

    // A bounded cache never holds more entries than its limit, and every value
    // it does return is one that was written for that key.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..100),
        max_entries in 1usize..10
    ) {
        let config = CacheConfig::default().with_max_entries(max_entries);
        let (cache, _clock) = test_cache(config);
        let mut latest: HashMap<String, String> = HashMap::new();

        for (key, value) in entries {
            cache.set(key.clone(), Some(value.clone()));
            latest.insert(key, value);
            prop_assert!(
                cache.stored_len() <= max_entries,
                "Cache size {} exceeds max {}",
                cache.stored_len(),
                max_entries
            );
        }

        for (key, value) in &latest {
            if let Some(found) = cache.get(key) {
                prop_assert_eq!(found.as_str(), value.as_str());
            }
        }
    }

    // Pressure relief drops entries as misses and never more than asked.
    #[test]
    fn prop_pressure_eviction_is_a_miss(
        keys in prop::collection::hash_set(key_strategy(), 1..20),
        count in 0usize..30
    ) {
        let (cache, _clock) = test_cache(CacheConfig::default());
        for key in &keys {
            cache.set(key.clone(), Some(format!("value_{}", key)));
        }

        let evicted = cache.relieve_pressure(count);

        prop_assert_eq!(evicted, count.min(keys.len()));
        let visible = keys.iter().filter(|key| cache.get(key.as_str()).is_some()).count();
        prop_assert_eq!(visible, keys.len() - evicted);
        prop_assert_eq!(cache.stats().evictions, evicted as u64);
    }
}

// Property tests for LRU victim selection through the cache
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Reading a key makes it the most recently used, so capacity eviction
    // picks the next oldest instead.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::hash_set("[a-z]{3}", 3..8),
        new_key in "[A-Z]{3}"
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let config = CacheConfig::default().with_max_entries(keys.len());
        let (cache, _clock) = test_cache(config);

        for key in &keys {
            cache.set(key.clone(), Some(format!("value_{}", key)));
        }

        let accessed_key = &keys[0];
        let expected_evicted = &keys[1];
        prop_assert!(cache.get(accessed_key).is_some());

        cache.set(new_key.clone(), Some("new".to_string()));

        prop_assert!(cache.get(accessed_key).is_some(), "Accessed key should survive");
        prop_assert!(cache.get(expected_evicted).is_none(), "Oldest key should be evicted");
        prop_assert!(cache.get(&new_key).is_some(), "New key should exist");
    }
}
