//! Configuration Module
//!
//! Construction-time settings for a cache instance, loadable from
//! environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::EvictionStrategy;
use crate::error::{CacheError, Result};

/// Capacity, expiry and storage settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub max_size: usize,
    /// Default TTL for entries set without an explicit one
    pub ttl: Duration,
    /// Whether oversized values are compressed
    pub compression: bool,
    /// Whether `save`/`load` reach the persistence adapter
    pub persistence: bool,
    /// Snapshot location, only meaningful with `persistence`
    pub storage_path: Option<PathBuf>,
}

impl CacheConfig {
    /// Loads the config from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum live entries (default: 1000)
    /// - `CACHE_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_COMPRESSION` - `true`/`false` (default: false)
    /// - `CACHE_PERSISTENCE` - `true`/`false` (default: false)
    /// - `CACHE_STORAGE_PATH` - Snapshot file path (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env_parse("CACHE_MAX_SIZE").unwrap_or(defaults.max_size),
            ttl: env_parse("CACHE_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.ttl),
            compression: env_parse("CACHE_COMPRESSION").unwrap_or(defaults.compression),
            persistence: env_parse("CACHE_PERSISTENCE").unwrap_or(defaults.persistence),
            storage_path: env::var("CACHE_STORAGE_PATH").ok().map(PathBuf::from),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl: Duration::from_secs(300),
            compression: false,
            persistence: false,
            storage_path: None,
        }
    }
}

/// Eviction, compression and sweep tuning.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub eviction_strategy: EvictionStrategy,
    /// Serialized size in bytes above which values are compressed
    pub compression_threshold: usize,
    /// Serialized size in bytes above which `set` is skipped
    pub max_entry_size: usize,
    /// Period of the background expiry sweep
    pub cleanup_interval: Duration,
}

impl CachePolicy {
    /// Loads the policy from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_EVICTION_STRATEGY` - `lru`, `lfu`, `ttl` or `size` (default: lru)
    /// - `CACHE_COMPRESSION_THRESHOLD` - Bytes (default: 1024)
    /// - `CACHE_MAX_ENTRY_SIZE` - Bytes (default: 1048576)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep period (default: 300000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            eviction_strategy: env_parse("CACHE_EVICTION_STRATEGY")
                .unwrap_or(defaults.eviction_strategy),
            compression_threshold: env_parse("CACHE_COMPRESSION_THRESHOLD")
                .unwrap_or(defaults.compression_threshold),
            max_entry_size: env_parse("CACHE_MAX_ENTRY_SIZE").unwrap_or(defaults.max_entry_size),
            cleanup_interval: env_parse("CACHE_CLEANUP_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.cleanup_interval),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            eviction_strategy: EvictionStrategy::Lru,
            compression_threshold: 1024,
            max_entry_size: 1024 * 1024,
            cleanup_interval: Duration::from_secs(300),
        }
    }
}

/// Rejects settings the cache cannot operate under.
pub fn validate(config: &CacheConfig, policy: &CachePolicy) -> Result<()> {
    if config.max_size == 0 {
        return Err(CacheError::InvalidConfig(
            "max_size must be at least 1".to_string(),
        ));
    }
    if config.ttl.is_zero() {
        return Err(CacheError::InvalidConfig(
            "default ttl must be non-zero".to_string(),
        ));
    }
    if policy.cleanup_interval.is_zero() {
        return Err(CacheError::InvalidConfig(
            "cleanup_interval must be non-zero".to_string(),
        ));
    }
    Ok(())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
