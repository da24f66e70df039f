//! Cache Manager Module
//!
//! Shareable, lock-protected handle over a [`CacheStore`] with a get-or-fetch
//! entry point and an explicitly started/stopped expiry sweeper.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{CacheConfig, CacheStats, CacheStore};
use crate::error::Result;
use crate::tasks::spawn_sweep_task;

/// Lower bound on the sweep interval; a zero interval would spin the timer.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

// == Cache Manager ==
/// TTL/LRU cache shared between the client and the sweep task.
///
/// Clones share the same store. The store lock is never held across an
/// `.await`, so a slow factory in [`get_or_set`](Self::get_or_set) does not
/// block other readers.
#[derive(Debug)]
pub struct CacheManager<V> {
    store: Arc<Mutex<CacheStore<V>>>,
    cleanup_interval: Duration,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<V> Clone for CacheManager<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cleanup_interval: self.cleanup_interval,
            sweeper: Arc::clone(&self.sweeper),
        }
    }
}

impl<V: Clone> CacheManager<V> {
    /// Creates a cache from configuration. The sweeper is not started.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(CacheStore::from_config(config))),
            cleanup_interval: config.cleanup_interval.max(MIN_SWEEP_INTERVAL),
            sweeper: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns a live value, counting a hit or a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        self.store.lock().get(key)
    }

    /// Stores a value, evicting the LRU entry if a new key overflows capacity.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.store.lock().set(key, value, ttl);
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.lock().has(key)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    pub fn clear(&self) {
        self.store.lock().clear();
    }

    // == Get Or Set ==
    /// Returns the cached value for `key`, or runs `factory` and caches its
    /// result under `ttl`.
    ///
    /// Factory errors are returned unchanged and nothing is cached. Concurrent
    /// misses on the same key each run their own factory.
    pub async fn get_or_set<F, Fut>(&self, key: &str, factory: F, ttl: Option<Duration>) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(key) {
            debug!(key, "cache hit");
            return Ok(value);
        }

        debug!(key, "cache miss, fetching");
        let value = factory().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Removes every key matching `pattern`, returning the count removed.
    pub fn invalidate_pattern(&self, pattern: &Regex) -> usize {
        self.store.lock().invalidate_pattern(pattern)
    }

    /// Removes expired entries now, independent of the sweeper schedule.
    pub fn cleanup_expired(&self) -> usize {
        self.store.lock().cleanup_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn reset_stats(&self) {
        self.store.lock().reset_stats();
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.lock().keys()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}

impl<V: Clone + Send + 'static> CacheManager<V> {
    // == Sweeper Lifecycle ==
    /// Starts the periodic expiry sweep on the current tokio runtime.
    ///
    /// Calling `start` while the sweeper is running is a no-op. The task only
    /// holds a weak reference to the store and exits once every manager
    /// handle is dropped.
    pub fn start(&self) {
        let mut sweeper = self.sweeper.lock();
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        *sweeper = Some(spawn_sweep_task(
            Arc::downgrade(&self.store),
            self.cleanup_interval,
        ));
    }

    /// Stops the sweeper if it is running.
    pub fn stop(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            debug!("cache sweeper stopped");
        }
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
