//! Cache Sweep Task
//!
//! Background task that periodically removes expired cache entries, so keys
//! that are never read again do not hold memory until evicted.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// The task holds only a weak reference to the store: once the owning
/// [`CacheManager`](crate::cache::CacheManager) handles are gone the next
/// tick finds nothing to upgrade and the loop ends on its own. The returned
/// handle can also be aborted for deterministic shutdown.
///
/// # Example
/// ```ignore
/// let cache = CacheManager::<String>::new(&CacheConfig::default());
/// cache.start(); // calls spawn_sweep_task internally
/// // Later, during shutdown:
/// cache.stop();
/// ```
pub fn spawn_sweep_task<V>(store: Weak<Mutex<CacheStore<V>>>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting cache sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = store.upgrade() else {
                debug!("Cache dropped, sweep task exiting");
                break;
            };

            let removed = store.lock().cleanup_expired();

            if removed > 0 {
                info!(removed, "Cache sweep: removed expired entries");
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
