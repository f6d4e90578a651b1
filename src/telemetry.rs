//! Tracing setup for host applications.
//!
//! The cache only emits `tracing` events; installing a subscriber is left to
//! the host. This helper installs the usual fmt subscriber with an env filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "intelligent_cache=info";

/// Installs a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_only_once() {
        init_tracing(DEFAULT_FILTER);
        // A second install must not panic and must report the conflict
        assert!(!init_tracing(DEFAULT_FILTER));
    }
}
