//! Cache configuration.

use std::time::Duration;

/// Configuration for a record cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,

    /// Time-to-live for cache entries.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 5_000,
            ttl: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Config with the given TTL and default capacity.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Default::default()
        }
    }
}
