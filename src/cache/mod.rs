//! Lookup caches built on Moka.
//!
//! Stores keep a cache of recently found records keyed by their unique
//! name. Every write through the store invalidates the affected keys, so
//! the cache only ever serves what this process last read or wrote.

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::RecordCache;
