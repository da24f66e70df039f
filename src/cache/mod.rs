//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod manager;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use lru::LruTracker;
pub use manager::CacheManager;
pub use stats::{hit_rate_percent, CacheStats};
pub use store::{CacheConfig, CacheStore};

/// Separator used by [`create_cache_key`].
pub const KEY_SEPARATOR: &str = ":";

/// Joins key parts with `:`, e.g. `["api", "GET", "/blocks"]` -> `api:GET:/blocks`.
pub fn create_cache_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|part| part.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_cache_key() {
        assert_eq!(create_cache_key(["api", "GET", "/blocks"]), "api:GET:/blocks");
        assert_eq!(create_cache_key(Vec::<String>::new()), "");
    }
}
