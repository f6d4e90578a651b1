//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries, so keys
//! that are written but never read again do not survive indefinitely.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for `interval` between sweeps. Each sweep takes the write
/// lock once and runs to completion. The task only holds a weak reference to
/// the store and stops on its own once the store is dropped.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during teardown.
///
/// # Panics
/// Must be called from within a tokio runtime.
pub fn spawn_cleanup_task<V>(
    store: Weak<RwLock<CacheStore<V>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = store.upgrade() else {
                debug!("Cache dropped, stopping TTL cleanup task");
                break;
            };

            let removed = store.write().cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
