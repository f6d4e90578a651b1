//! Eviction Policy Module
//!
//! Picks the victim key when an insert finds the store at capacity.
//!
//! Every strategy is a single full scan over the entries in insertion order.
//! When several entries tie on the compared field the first one scanned wins.
//! That tie-break is stable but carries no meaning beyond "inserted earlier".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;
use crate::error::CacheError;

// == Eviction Strategy ==
/// Rule used to choose which entry to drop when the cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Least recently inserted or read (smallest `access_seq`)
    #[default]
    Lru,
    /// Smallest `access_count`
    Lfu,
    /// Earliest inserted (smallest `insert_seq`), regardless of access pattern
    Ttl,
    /// Largest `size_bytes`
    Size,
}

impl EvictionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Lfu => "lfu",
            EvictionStrategy::Ttl => "ttl",
            EvictionStrategy::Size => "size",
        }
    }

    // == Select Victim ==
    /// Returns the key this strategy would evict, or `None` for an empty scan.
    pub fn select_victim<'a, V, I>(&self, entries: I) -> Option<&'a str>
    where
        V: 'a,
        I: IntoIterator<Item = &'a CacheEntry<V>>,
    {
        let entries = entries.into_iter();
        let victim = match self {
            EvictionStrategy::Lru => first_min_by_key(entries, |e| e.access_seq),
            EvictionStrategy::Lfu => first_min_by_key(entries, |e| e.access_count),
            EvictionStrategy::Ttl => first_min_by_key(entries, |e| e.insert_seq),
            // Reversed ordering turns "first maximum" into "first minimum"
            EvictionStrategy::Size => {
                first_min_by_key(entries, |e| std::cmp::Reverse(e.size_bytes))
            }
        };
        victim.map(|e| e.key.as_str())
    }
}

/// Like `Iterator::min_by_key`, but keeps the earliest element on ties.
fn first_min_by_key<'a, V, K, I, F>(entries: I, key_fn: F) -> Option<&'a CacheEntry<V>>
where
    K: Ord,
    I: Iterator<Item = &'a CacheEntry<V>>,
    F: Fn(&CacheEntry<V>) -> K,
{
    let mut best: Option<(&'a CacheEntry<V>, K)> = None;
    for entry in entries {
        let k = key_fn(entry);
        let better = match &best {
            Some((_, best_k)) => k < *best_k,
            None => true,
        };
        if better {
            best = Some((entry, k));
        }
    }
    best.map(|(entry, _)| entry)
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EvictionStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionStrategy::Lru),
            "lfu" => Ok(EvictionStrategy::Lfu),
            "ttl" => Ok(EvictionStrategy::Ttl),
            "size" => Ok(EvictionStrategy::Size),
            other => Err(CacheError::InvalidConfig(format!(
                "Unknown eviction strategy: {other}"
            ))),
        }
    }
}
