//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Hit Counters ==
/// Raw counters maintained by the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl HitCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Cache Stats ==
/// Point-in-time cache statistics reported to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Current number of entries (live or not yet swept)
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses) * 100`, or 0 before any read
    pub hit_rate: f64,
    /// Entries removed by LRU eviction
    pub evictions: u64,
}

impl CacheStats {
    /// Builds a snapshot from raw counters.
    pub fn snapshot(counters: HitCounters, size: usize, max_size: usize) -> Self {
        Self {
            size,
            max_size,
            hits: counters.hits,
            misses: counters.misses,
            hit_rate: hit_rate_percent(counters.hits, counters.misses),
            evictions: counters.evictions,
        }
    }
}

/// Calculates the hit rate as a percentage.
pub fn hit_rate_percent(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(hit_rate_percent(0, 0), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        assert_eq!(hit_rate_percent(3, 0), 100.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        assert_eq!(hit_rate_percent(1, 1), 50.0);
        assert!((hit_rate_percent(1, 2) - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_snapshot() {
        let mut counters = HitCounters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        counters.record_eviction();

        let stats = CacheStats::snapshot(counters, 7, 10);
        assert_eq!(stats.size, 7);
        assert_eq!(stats.max_size, 10);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 75.0);
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = CacheStats::snapshot(HitCounters::default(), 0, 100);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["maxSize"], 100);
        assert_eq!(json["hitRate"], 0.0);
    }
}
