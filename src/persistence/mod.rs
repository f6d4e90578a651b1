//! Persistence Module
//!
//! Boundary between a cache instance and whatever storage medium the host
//! wires in. The cache only calls an adapter from explicit `save`/`load`
//! calls and absorbs every failure it reports.
//!
//! # Adapters
//! - `JsonFileAdapter`: JSON snapshot file at a configured path

mod file;

use async_trait::async_trait;

use crate::cache::CacheEntry;

pub use file::JsonFileAdapter;

/// Save/load hooks for cache entries.
///
/// Errors are `anyhow::Error` because the failure modes belong to the host's
/// storage, not to the cache.
#[async_trait]
pub trait PersistenceAdapter<V: Send + Sync + 'static>: Send + Sync {
    /// Persists the given entries, replacing whatever was saved before.
    async fn save(&self, entries: &[CacheEntry<V>]) -> anyhow::Result<()>;

    /// Returns the most recently saved entries, or none if nothing was saved.
    async fn load(&self) -> anyhow::Result<Vec<CacheEntry<V>>>;
}
