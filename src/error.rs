//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! Misses, expiry and eviction are never errors; they surface as return
//! values. The variants below cover caller mistakes, codec failures the
//! cache logs and absorbs, and persistence failures reported by
//! `try_save`/`try_load`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key pattern passed to `invalidate_pattern` is not a valid regex
    #[error("Invalid key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Value could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Persistence adapter failed to save or load
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Codec(err.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Codec(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
