//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access
//! metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Stored Value ==
/// The payload of an entry, either as handed to `set` or codec-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", content = "data", rename_all = "snake_case")]
pub enum StoredValue<V> {
    Raw(V),
    Encoded(Vec<u8>),
}

// == Cache Entry ==
/// A single cache entry with value and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: StoredValue<V>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Maximum age before the entry is expired
    #[serde(with = "duration_ms")]
    pub ttl: Duration,
    /// Number of successful `get`s since creation
    pub access_count: u64,
    /// Last `get` timestamp (Unix milliseconds), creation time until read
    pub last_accessed_at: u64,
    pub compressed: bool,
    /// Serialized size at insertion, post-compression when compressed
    pub size_bytes: usize,
    /// Store-local tick of the insert; orders entries by age
    #[serde(default)]
    pub insert_seq: u64,
    /// Store-local tick of the last insert or read; orders entries by recency
    #[serde(default)]
    pub access_seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry holding a raw value.
    pub fn new(key: String, value: V, ttl: Duration, size_bytes: usize) -> Self {
        let now = current_timestamp_ms();
        Self {
            key,
            value: StoredValue::Raw(value),
            created_at: now,
            ttl,
            access_count: 0,
            last_accessed_at: now,
            compressed: false,
            size_bytes,
            insert_seq: 0,
            access_seq: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once strictly more than `ttl` has passed since
    /// creation. This predicate backs both lazy removal on read and the
    /// background sweep.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at) > duration_to_ms(self.ttl)
    }

    // == Touch ==
    /// Records a read at the store's current tick.
    pub fn touch(&mut self, seq: u64) {
        self.access_count += 1;
        self.access_seq = seq;
        self.last_accessed_at = current_timestamp_ms();
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let deadline = self.created_at.saturating_add(duration_to_ms(self.ttl));
        deadline.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn duration_to_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(super::duration_to_ms(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
