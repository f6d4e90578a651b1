//! Intelligent Cache - A bounded in-process cache
//!
//! Mediates access to expensive-to-produce values with TTL expiration,
//! pluggable eviction (LRU, LFU, oldest-first, largest-first), optional
//! compression, a background expiry sweep and optional persistence hooks.
//!
//! ```no_run
//! use intelligent_cache::{CacheConfig, CachePolicy, IntelligentCache};
//!
//! # #[tokio::main]
//! # async fn main() -> intelligent_cache::Result<()> {
//! let cache: IntelligentCache<String> =
//!     IntelligentCache::new(CacheConfig::default(), CachePolicy::default())?;
//!
//! cache.set("greeting", "hello".to_string(), None);
//! assert_eq!(cache.get("greeting").as_deref(), Some("hello"));
//!
//! cache.destroy();
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod persistence;
pub mod tasks;
pub mod telemetry;

pub use cache::{CacheEntry, CacheStats, EvictionStrategy, IntelligentCache, Lookup, WarmupEntry};
pub use config::{CacheConfig, CachePolicy};
pub use error::{CacheError, Result};
pub use persistence::{JsonFileAdapter, PersistenceAdapter};
