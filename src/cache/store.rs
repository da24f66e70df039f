//! Cache Store Module
//!
//! Cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use regex::Regex;

use crate::cache::stats::HitCounters;
use crate::cache::{current_timestamp_ms, CacheEntry, CacheStats, LruTracker};

// == Cache Config ==
/// Cache sizing and expiry parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Default time to live for entries stored without an explicit TTL
    pub ttl: Duration,
    /// Maximum number of entries held at once
    pub max_size: usize,
    /// Interval of the background expiry sweep
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5),
            max_size: 1000,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

// == Cache Store ==
/// Cache storage with LRU eviction and TTL support.
///
/// Not synchronized; [`CacheManager`](crate::cache::CacheManager) owns the lock.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Hit/miss/eviction counters
    counters: HitCounters,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL applied when the caller passes none
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and default TTL.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: HitCounters::default(),
            max_size: max_size.max(1),
            default_ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_size, config.ttl)
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Missing and expired keys count as misses; expired entries are dropped
    /// on the way out.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = current_timestamp_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.counters.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_access();
        let value = entry.value.clone();
        self.counters.record_hit();
        self.lru.touch(key);
        Some(value)
    }

    // == Set ==
    /// Stores a value, replacing any previous entry under the same key.
    ///
    /// Inserting a new key into a full store first evicts the least recently
    /// used entry. `ttl` overrides the default for this entry only; `None` or
    /// a zero duration falls back to the default.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.evict_lru();
        }

        let effective_ttl = ttl
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or(self.default_ttl);

        self.entries
            .insert(key.clone(), CacheEntry::new(value, effective_ttl));
        self.lru.touch(&key);
    }

    // == Has ==
    /// True if the key holds a live entry. Does not touch statistics or recency.
    pub fn has(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.remove_entry(key);
        }
        !expired
    }

    // == Delete ==
    /// Removes an entry by key, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key)
    }

    // == Clear ==
    /// Removes every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Invalidate Pattern ==
    /// Removes every key matching `pattern`, returning how many were removed.
    pub fn invalidate_pattern(&mut self, pattern: &Regex) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        for key in &matching {
            self.remove_entry(key);
        }
        matching.len()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats::snapshot(self.counters, self.entries.len(), self.max_size)
    }

    /// Zeroes hit, miss and eviction counters.
    pub fn reset_stats(&mut self) {
        self.counters = HitCounters::default();
    }

    /// Returns every stored key, including expired ones not yet swept.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the stored entry, if any, without updating access metadata.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn evict_lru(&mut self) {
        if let Some(victim) = self.lru.evict_oldest() {
            self.entries.remove(&victim);
            self.counters.record_eviction();
        }
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const TTL: Duration = Duration::from_secs(300);

    fn store(max_size: usize) -> CacheStore<String> {
        CacheStore::new(max_size, TTL)
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.peek("key1").unwrap().access_count, 1);
    }

    #[test]
    fn test_store_get_nonexistent_is_miss() {
        let mut store = store(100);

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), None);
        store.set("key1", "value2".to_string(), None);

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2);

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        // Replacing a key does not grow the store, so nothing is evicted.
        // A plain `size >= max_size` check before every insert would evict here.
        store.set("a", "3".to_string(), None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get("b"), Some("2".to_string()));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), Some(Duration::from_millis(50)));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(80));

        assert_eq!(store.get("key1"), None);
        // Expired read drops the entry and counts a miss
        assert!(store.is_empty());
        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_store_zero_ttl_uses_default() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), Some(Duration::ZERO));
        let entry = store.peek("key1").unwrap();

        assert_eq!(entry.expires_at - entry.created_at, TTL.as_millis() as u64);
    }

    #[test]
    fn test_store_has_does_not_count() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), Some(Duration::from_millis(30)));
        assert!(store.has("key1"));
        assert!(!store.has("missing"));

        sleep(Duration::from_millis(50));
        assert!(!store.has("key1"));
        assert!(store.is_empty());

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        store.set("key1", "value1".to_string(), None);
        store.set("key2", "value2".to_string(), None);
        store.set("key3", "value3".to_string(), None);
        store.set("key4", "value4".to_string(), None);

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 1);
        assert!(!store.has("key1"));
        assert!(store.has("key2"));
        assert!(store.has("key3"));
        assert!(store.has("key4"));
    }

    #[test]
    fn test_store_lru_get_protects_key() {
        let mut store = store(3);

        store.set("key1", "value1".to_string(), None);
        store.set("key2", "value2".to_string(), None);
        store.set("key3", "value3".to_string(), None);

        store.get("key1");
        store.set("key4", "value4".to_string(), None);

        assert!(store.has("key1"));
        assert!(!store.has("key2"));
    }

    #[test]
    fn test_store_clear_keeps_stats() {
        let mut store = store(10);

        store.set("a", "1".to_string(), None);
        store.get("a");
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().hits, 1);

        store.reset_stats();
        assert_eq!(store.stats().hits, 0);
    }

    #[test]
    fn test_store_invalidate_pattern() {
        let mut store = store(10);

        store.set("api:/blocks/1", "b1".to_string(), None);
        store.set("api:/blocks/2", "b2".to_string(), None);
        store.set("api:/transactions/abc", "tx".to_string(), None);

        let removed = store.invalidate_pattern(&Regex::new("^api:/blocks/").unwrap());

        assert_eq!(removed, 2);
        assert_eq!(store.keys(), vec!["api:/transactions/abc".to_string()]);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(100);

        store.set("key1", "value1".to_string(), Some(Duration::from_millis(30)));
        store.set("key2", "value2".to_string(), Some(Duration::from_secs(10)));

        sleep(Duration::from_millis(50));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.has("key2"));
    }

    #[test]
    fn test_store_zero_capacity_raised_to_one() {
        let mut store = store(0);
        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);

        assert_eq!(store.max_size(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.has("b"));
    }
}
