//! Cache Module
//!
//! Provides a bounded in-memory cache with TTL expiration, pluggable
//! eviction and optional compression.

pub mod compression;
mod entry;
mod eviction;
mod intelligent;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, StoredValue};
pub use eviction::EvictionStrategy;
pub use intelligent::IntelligentCache;
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup, WarmupEntry};
