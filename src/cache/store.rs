//! Cache Store Module
//!
//! Main cache engine: an insertion-ordered map of entries with TTL expiry,
//! strategy-driven eviction and optional compression.
//!
//! `CacheStore` itself does no locking. Every operation runs to completion
//! on `&mut self`, so callers sharing a store wrap it in a lock (see
//! `IntelligentCache`).

use std::time::Duration;

use indexmap::IndexMap;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::cache::compression::{compress, decompress, serialized_size};
use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, StoredValue};
use crate::config::{CacheConfig, CachePolicy};
use crate::error::Result;

// == Lookup ==
/// Outcome of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// Live entry, decoded if it was stored compressed
    Hit(V),
    /// Live entry whose compressed payload failed to decode
    Degraded { raw: Vec<u8> },
    /// Absent or expired
    Miss,
}

impl<V> Lookup<V> {
    /// The decoded value, if any. A degraded read yields `None`.
    pub fn into_value(self) -> Option<V> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Degraded { .. } | Lookup::Miss => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

// == Warmup Entry ==
/// One item of a bulk preload.
#[derive(Debug, Clone)]
pub struct WarmupEntry<V> {
    pub key: String,
    pub value: V,
    pub ttl: Option<Duration>,
}

impl<V> WarmupEntry<V> {
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

// == Cache Store ==
/// Bounded cache storage with pluggable eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage in insertion order
    entries: IndexMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL for entries set without an explicit one
    default_ttl: Duration,
    /// Whether values above the threshold are compressed
    compression: bool,
    policy: CachePolicy,
    /// Bumped on every insert and hit; drives LRU and TTL eviction order
    tick: u64,
}

impl<V> CacheStore<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Creates an empty store from the given settings.
    pub fn new(config: &CacheConfig, policy: CachePolicy) -> Self {
        Self {
            entries: IndexMap::new(),
            stats: CacheStats::new(),
            max_size: config.max_size,
            default_ttl: config.ttl,
            compression: config.compression,
            policy,
            tick: 0,
        }
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// A missing or zero `ttl` falls back to the default. Values whose
    /// serialized size exceeds `max_entry_size` are skipped with a warning.
    /// If the key is new and the store is full, exactly one victim chosen by
    /// the eviction strategy is removed first.
    ///
    /// Returns whether the value was stored.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> bool {
        let key = key.into();
        let ttl = ttl.filter(|t| !t.is_zero()).unwrap_or(self.default_ttl);
        let size = serialized_size(&value);

        if size > self.policy.max_entry_size {
            warn!(
                "Entry {} is too large ({} bytes, limit {}), skipping cache",
                key, size, self.policy.max_entry_size
            );
            return false;
        }

        let mut entry = CacheEntry::new(key.clone(), value, ttl, size);
        self.tick += 1;
        entry.insert_seq = self.tick;
        entry.access_seq = self.tick;
        if self.compression && size > self.policy.compression_threshold {
            self.compress_entry(&mut entry);
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.evict_one();
        }

        self.entries.insert(key, entry);
        self.refresh_stats();
        true
    }

    fn compress_entry(&mut self, entry: &mut CacheEntry<V>) {
        let StoredValue::Raw(raw) = &entry.value else {
            return;
        };
        match compress(raw) {
            Ok(encoded) => {
                entry.size_bytes = encoded.len();
                entry.value = StoredValue::Encoded(encoded);
                entry.compressed = true;
                self.stats.record_compression();
            }
            Err(e) => {
                error!("Compression failed for {}, storing raw: {}", entry.key, e);
            }
        }
    }

    // == Evict ==
    /// Removes the strategy's victim, if any.
    fn evict_one(&mut self) {
        let victim = self
            .policy
            .eviction_strategy
            .select_victim(self.entries.values())
            .map(str::to_owned);

        if let Some(victim) = victim {
            self.entries.shift_remove(&victim);
            self.stats.record_eviction();
            debug!(
                "Evicted {} ({} strategy)",
                victim, self.policy.eviction_strategy
            );
        }
    }

    // == Lookup ==
    /// Reads a key, distinguishing hits, degraded reads and misses.
    ///
    /// A hit bumps the entry's access count and recency. An expired entry is
    /// removed and counted as a single miss. A degraded read also counts as a
    /// miss, since no value reaches the caller.
    pub fn lookup(&mut self, key: &str) -> Lookup<V> {
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return Lookup::Miss;
        };

        if entry.is_expired() {
            self.entries.shift_remove(key);
            self.stats.record_miss();
            self.refresh_stats();
            return Lookup::Miss;
        }

        self.tick += 1;
        entry.touch(self.tick);
        let read = match &entry.value {
            StoredValue::Raw(value) => Lookup::Hit(value.clone()),
            StoredValue::Encoded(bytes) => match decompress(bytes) {
                Ok(value) => Lookup::Hit(value),
                Err(e) => {
                    warn!("Decompression failed for {}: {}", key, e);
                    Lookup::Degraded { raw: bytes.clone() }
                }
            },
        };

        match read {
            Lookup::Hit(_) => self.stats.record_hit(),
            _ => {
                self.stats.record_miss();
                self.stats.record_degraded_read();
            }
        }
        read
    }

    // == Get ==
    /// Returns the live value for a key.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.lookup(key).into_value()
    }

    // == Has ==
    /// True iff the key is present and live. Leaves access metadata and
    /// hit/miss counters untouched; an expired entry is dropped.
    pub fn has(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };
        if expired {
            self.entries.shift_remove(key);
            self.refresh_stats();
        }
        !expired
    }

    // == Delete ==
    /// Removes an entry by key, returning whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.shift_remove(key).is_some();
        if removed {
            self.refresh_stats();
        }
        removed
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.refresh_stats();
    }

    // == Invalidate Pattern ==
    /// Deletes every key matching the regular expression and returns how many
    /// live entries were removed. Expired matches are dropped without being
    /// counted.
    pub fn invalidate_pattern(&mut self, pattern: &str) -> Result<usize> {
        let regex = Regex::new(pattern)?;
        let now = current_timestamp_ms();
        let mut invalidated = 0;

        self.entries.retain(|key, entry| {
            if !regex.is_match(key) {
                return true;
            }
            if !entry.is_expired_at(now) {
                invalidated += 1;
            }
            false
        });

        self.refresh_stats();
        debug!("Invalidated {} entries matching {}", invalidated, pattern);
        Ok(invalidated)
    }

    // == Warmup ==
    /// Sets each entry in order.
    pub fn warmup<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = WarmupEntry<V>>,
    {
        for WarmupEntry { key, value, ttl } in entries {
            self.set(key, value, ttl);
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - self.entries.len();

        if removed > 0 {
            self.refresh_stats();
        }
        removed
    }

    // == Snapshot / Restore ==
    /// Copies every entry, expired or not, in insertion order.
    pub fn snapshot(&self) -> Vec<CacheEntry<V>> {
        self.entries.values().cloned().collect()
    }

    /// Re-inserts persisted entries with their metadata intact.
    ///
    /// Expired entries are skipped and capacity is enforced as in `set`.
    /// Persisted ticks are shifted past the current one so restored entries
    /// keep their relative order and rank as newer than what is already held.
    /// Returns the number of entries restored.
    pub fn restore(&mut self, entries: Vec<CacheEntry<V>>) -> usize {
        let now = current_timestamp_ms();
        let base = self.tick;
        let mut restored = 0;

        for mut entry in entries {
            if entry.is_expired_at(now) {
                continue;
            }
            entry.insert_seq = base.saturating_add(entry.insert_seq);
            entry.access_seq = base.saturating_add(entry.access_seq);
            self.tick = self.tick.max(entry.insert_seq).max(entry.access_seq);
            if !self.entries.contains_key(&entry.key) && self.entries.len() >= self.max_size {
                self.evict_one();
            }
            self.entries.insert(entry.key.clone(), entry);
            restored += 1;
        }

        self.refresh_stats();
        restored
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    fn refresh_stats(&mut self) {
        let total_size = self.entries.values().map(|e| e.size_bytes).sum();
        self.stats.set_live(self.entries.len(), total_size);
    }

    /// Keys in insertion order, including not-yet-swept expired ones.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of `size_bytes` over stored entries.
    pub fn total_size(&self) -> usize {
        self.stats.total_size
    }

    /// Read-only view of one entry's metadata.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }
}
