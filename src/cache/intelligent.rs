//! Intelligent Cache
//!
//! The owning handle applications hold: a lock-protected `CacheStore`, the
//! background TTL sweep, and an optional persistence adapter.
//!
//! Every synchronous operation takes the lock once and runs to completion,
//! so operations are atomic with respect to each other and to the sweep.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::cache::{CacheEntry, CacheStats, CacheStore, Lookup, WarmupEntry};
use crate::config::{self, CacheConfig, CachePolicy};
use crate::error::{CacheError, Result};
use crate::persistence::{JsonFileAdapter, PersistenceAdapter};
use crate::tasks::spawn_cleanup_task;

// == Intelligent Cache ==
/// A bounded cache instance with its own configuration and lifecycle.
///
/// Instances are independent; any number may coexist.
pub struct IntelligentCache<V: Send + Sync + 'static> {
    store: Arc<RwLock<CacheStore<V>>>,
    config: CacheConfig,
    policy: CachePolicy,
    cleanup_handle: Mutex<Option<JoinHandle<()>>>,
    persistence: Option<Arc<dyn PersistenceAdapter<V>>>,
}

impl<V> IntelligentCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its background sweep.
    ///
    /// The sweep needs a tokio runtime. Outside of one the cache still works,
    /// relying on lazy expiry only, and a warning is logged.
    ///
    /// With `persistence` enabled and a `storage_path` set, a
    /// [`JsonFileAdapter`] at that path is wired in.
    pub fn new(config: CacheConfig, policy: CachePolicy) -> Result<Self> {
        config::validate(&config, &policy)?;

        let store = Arc::new(RwLock::new(CacheStore::new(&config, policy.clone())));

        let cleanup_handle = if tokio::runtime::Handle::try_current().is_ok() {
            Some(spawn_cleanup_task(
                Arc::downgrade(&store),
                policy.cleanup_interval,
            ))
        } else {
            warn!("No tokio runtime available, background TTL cleanup disabled");
            None
        };

        let persistence: Option<Arc<dyn PersistenceAdapter<V>>> =
            match (&config.storage_path, config.persistence) {
                (Some(path), true) => Some(Arc::new(JsonFileAdapter::<V>::new(path))),
                _ => None,
            };

        info!(
            "Cache created: max_size={}, ttl={}ms, strategy={}, compression={}",
            config.max_size,
            config.ttl.as_millis(),
            policy.eviction_strategy,
            config.compression
        );

        Ok(Self {
            store,
            config,
            policy,
            cleanup_handle: Mutex::new(cleanup_handle),
            persistence,
        })
    }

    /// Replaces the persistence adapter.
    pub fn with_persistence(mut self, adapter: impl PersistenceAdapter<V> + 'static) -> Self {
        self.persistence = Some(Arc::new(adapter));
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    // == Core Operations ==
    /// See [`CacheStore::set`].
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> bool {
        self.store.write().set(key, value, ttl)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.store.write().get(key)
    }

    /// See [`CacheStore::lookup`].
    pub fn lookup(&self, key: &str) -> Lookup<V> {
        self.store.write().lookup(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.write().has(key)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.store.write().delete(key)
    }

    pub fn clear(&self) {
        self.store.write().clear();
    }

    // == Get Or Set ==
    /// Returns the cached value, or computes, stores and returns it.
    ///
    /// The lock is not held while `factory` runs. A degraded read counts as
    /// absent, so the factory replaces the undecodable entry.
    pub fn get_or_set<F>(&self, key: &str, factory: F, ttl: Option<Duration>) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }

        let value = factory();
        self.set(key, value.clone(), ttl);
        value
    }

    /// Async form of [`get_or_set`](Self::get_or_set).
    ///
    /// There is no single-flight: concurrent misses on the same key each run
    /// their factory, and whichever finishes last overwrites the others.
    pub async fn get_or_set_async<F, Fut>(
        &self,
        key: &str,
        factory: F,
        ttl: Option<Duration>,
    ) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(key) {
            return value;
        }

        let value = factory().await;
        self.set(key, value.clone(), ttl);
        value
    }

    /// See [`CacheStore::invalidate_pattern`].
    pub fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        self.store.write().invalidate_pattern(pattern)
    }

    pub fn warmup<I>(&self, entries: I)
    where
        I: IntoIterator<Item = WarmupEntry<V>>,
    {
        self.store.write().warmup(entries);
    }

    /// Runs one expiry sweep immediately, outside the schedule.
    pub fn cleanup_expired(&self) -> usize {
        self.store.write().cleanup_expired()
    }

    // == Introspection ==
    pub fn stats(&self) -> CacheStats {
        self.store.read().stats()
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.read().keys()
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    pub fn total_size(&self) -> usize {
        self.store.read().total_size()
    }

    /// Copies of the stored entries, in insertion order.
    pub fn entries(&self) -> Vec<CacheEntry<V>> {
        self.store.read().snapshot()
    }

    /// Whether the background sweep is still scheduled.
    pub fn cleanup_running(&self) -> bool {
        self.cleanup_handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Persistence ==
    fn persistence_target(&self) -> Option<Arc<dyn PersistenceAdapter<V>>> {
        if !self.config.persistence {
            return None;
        }
        self.persistence.clone()
    }

    /// Hands every stored entry to the persistence adapter.
    ///
    /// Returns `Ok(None)` unless persistence is enabled and an adapter is
    /// wired, otherwise the number of entries saved. Adapter failures come
    /// back as [`CacheError::Persistence`].
    pub async fn try_save(&self) -> Result<Option<usize>> {
        let Some(adapter) = self.persistence_target() else {
            return Ok(None);
        };

        let entries = self.store.read().snapshot();
        adapter
            .save(&entries)
            .await
            .map_err(|e| CacheError::Persistence(format!("save failed: {e:#}")))?;
        Ok(Some(entries.len()))
    }

    /// Restores entries from the persistence adapter.
    ///
    /// Same no-op and error rules as [`try_save`](Self::try_save). Returns the
    /// number of entries restored.
    pub async fn try_load(&self) -> Result<Option<usize>> {
        let Some(adapter) = self.persistence_target() else {
            return Ok(None);
        };

        let entries = adapter
            .load()
            .await
            .map_err(|e| CacheError::Persistence(format!("load failed: {e:#}")))?;
        Ok(Some(self.store.write().restore(entries)))
    }

    /// Like [`try_save`](Self::try_save), but failures are logged and never
    /// returned. Returns whether a save succeeded.
    pub async fn save(&self) -> bool {
        match self.try_save().await {
            Ok(Some(saved)) => {
                info!("Cache saved ({} entries)", saved);
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!("Error saving cache: {}", e);
                false
            }
        }
    }

    /// Like [`try_load`](Self::try_load), but failures are logged and count
    /// as nothing restored.
    pub async fn load(&self) -> usize {
        match self.try_load().await {
            Ok(Some(restored)) => {
                info!("Cache loaded ({} entries)", restored);
                restored
            }
            Ok(None) => 0,
            Err(e) => {
                error!("Error loading cache: {}", e);
                0
            }
        }
    }

    // == Destroy ==
    /// Stops the background sweep and empties the store.
    ///
    /// The cache stays usable afterwards, with lazy expiry only.
    pub fn destroy(&self) {
        if let Some(handle) = self.cleanup_handle.lock().take() {
            handle.abort();
            info!("TTL cleanup task stopped");
        }
        self.store.write().clear();
    }
}

impl<V: Send + Sync + 'static> Drop for IntelligentCache<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup_handle.get_mut().take() {
            handle.abort();
        }
    }
}
