//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's invariants over random operation
//! sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{CacheStore, EvictionStrategy, WarmupEntry};
use crate::config::{CacheConfig, CachePolicy};

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 100;

fn store(max_size: usize, strategy: EvictionStrategy, compression: bool) -> CacheStore<String> {
    let config = CacheConfig {
        max_size,
        compression,
        ..CacheConfig::default()
    };
    let policy = CachePolicy {
        eviction_strategy: strategy,
        compression_threshold: 10,
        ..CachePolicy::default()
    };
    CacheStore::new(&config, policy)
}

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_:]{1,24}"
}

/// Generates cache values, including multi-byte text
fn value_strategy() -> impl Strategy<Value = String> {
    "\\PC{0,200}"
}

fn eviction_strategy() -> impl Strategy<Value = EvictionStrategy> {
    prop_oneof![
        Just(EvictionStrategy::Lru),
        Just(EvictionStrategy::Lfu),
        Just(EvictionStrategy::Ttl),
        Just(EvictionStrategy::Size),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Has { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so operations actually collide
    let key = "k[0-9]";
    prop_oneof![
        (key, value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Has { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits and misses reflect exactly the `get`s that did and did not return
    // a value; `has` never moves the counters.
    #[test]
    fn prop_statistics_accuracy(
        ops in prop::collection::vec(cache_op_strategy(), 1..60),
        strategy in eviction_strategy(),
    ) {
        let mut store = store(4, strategy, false);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key, value, None);
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Has { key } => {
                    store.has(&key);
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");

        let requests = expected_hits + expected_misses;
        if requests > 0 {
            let expected_rate = expected_hits as f64 / requests as f64 * 100.0;
            prop_assert!((stats.hit_rate - expected_rate).abs() < 1e-9);
            prop_assert!((stats.hit_rate + stats.miss_rate - 100.0).abs() < 1e-9);
        }
    }

    // Storing then reading before expiry returns the stored value.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let mut store = store(TEST_MAX_SIZE, EvictionStrategy::Lru, false);

        store.set(key.clone(), value.clone(), None);

        prop_assert_eq!(store.get(&key), Some(value));
    }

    // The compressed flag is invisible to readers.
    #[test]
    fn prop_compressed_roundtrip(key in key_strategy(), value in "\\PC{20,400}") {
        let mut store = store(TEST_MAX_SIZE, EvictionStrategy::Lru, true);

        store.set(key.clone(), value.clone(), None);

        prop_assert!(store.entry(&key).unwrap().compressed);
        prop_assert_eq!(store.get(&key), Some(value));
    }

    // After a delete the key reads as a miss.
    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), value in value_strategy()) {
        let mut store = store(TEST_MAX_SIZE, EvictionStrategy::Lru, false);

        store.set(key.clone(), value, None);
        prop_assert!(store.has(&key), "Key should exist before delete");

        prop_assert!(store.delete(&key));

        prop_assert!(store.get(&key).is_none(), "Key should not exist after delete");
    }

    // The last write to a key wins and the key is stored once.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = store(TEST_MAX_SIZE, EvictionStrategy::Lru, false);

        store.set(key.clone(), value1, None);
        store.set(key.clone(), value2.clone(), None);

        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // The store never holds more than `max_size` entries and evicts exactly
    // once per insert of a new key into a full store.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200),
        strategy in eviction_strategy(),
    ) {
        let max_size = 16;
        let mut store = store(max_size, strategy, false);
        let mut expected_evictions = 0u64;

        for (key, value) in entries {
            let is_new = store.entry(&key).is_none();
            if is_new && store.len() >= max_size {
                expected_evictions += 1;
            }
            store.set(key, value, None);
            prop_assert!(
                store.len() <= max_size,
                "Cache size {} exceeds max {}",
                store.len(),
                max_size
            );
        }

        prop_assert_eq!(store.stats().evictions, expected_evictions);
    }

    // Exactly the matching keys are removed and counted.
    #[test]
    fn prop_invalidate_pattern_exact(
        keys in prop::collection::hash_set(key_strategy(), 1..40),
        prefix in "[a-z]{1,2}",
    ) {
        let mut store = store(TEST_MAX_SIZE, EvictionStrategy::Lru, false);
        for key in &keys {
            store.set(key.clone(), "v".to_string(), None);
        }

        let pattern = format!("^{prefix}");
        let matching: HashSet<&String> = keys.iter().filter(|k| k.starts_with(&prefix)).collect();

        let removed = store.invalidate_pattern(&pattern).unwrap();

        prop_assert_eq!(removed, matching.len());
        for key in &keys {
            prop_assert_eq!(store.has(key), !matching.contains(key));
        }
    }

    // Warmup followed by get yields each listed value; later duplicates win.
    #[test]
    fn prop_warmup_then_get(
        items in prop::collection::vec((key_strategy(), value_strategy()), 1..30)
    ) {
        let mut store = store(TEST_MAX_SIZE, EvictionStrategy::Lru, false);

        store.warmup(
            items
                .iter()
                .map(|(k, v)| WarmupEntry::new(k.clone(), v.clone()))
                .collect::<Vec<_>>(),
        );

        for (key, _) in &items {
            let expected = items.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone());
            prop_assert_eq!(store.get(key), expected);
        }
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After the TTL elapses, `has` and `get` both report absence and the
    // entry is gone rather than lingering.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy()
    ) {
        let mut store = store(TEST_MAX_SIZE, EvictionStrategy::Lru, false);

        store.set(key.clone(), value.clone(), Some(Duration::from_millis(40)));
        prop_assert_eq!(store.get(&key), Some(value), "Value should match before expiration");

        sleep(Duration::from_millis(70));

        prop_assert!(!store.has(&key));
        prop_assert!(store.get(&key).is_none(), "Entry should not be found after TTL expires");
        prop_assert_eq!(store.len(), 0);
    }
}

// Property tests for LRU eviction behavior
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Filling the store then reading every key but one makes that key the
    // LRU victim for the next new insert.
    #[test]
    fn prop_lru_evicts_untouched_key(
        keys in prop::collection::hash_set(key_strategy(), 2..8),
        skip_index in any::<prop::sample::Index>(),
        new_key in "new_[a-z]{1,8}",
    ) {
        prop_assume!(!keys.contains(&new_key));
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len();
        let mut store = store(capacity, EvictionStrategy::Lru, false);

        for key in &keys {
            store.set(key.clone(), format!("value_{key}"), None);
        }

        let untouched = skip_index.get(&keys).clone();
        for key in keys.iter().filter(|k| **k != untouched) {
            store.get(key);
        }

        store.set(new_key.clone(), "fresh".to_string(), None);

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(!store.has(&untouched), "Untouched key '{}' should be evicted", untouched);
        prop_assert!(store.has(&new_key));
    }
}
