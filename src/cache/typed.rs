//! Name-keyed record cache.

use std::sync::Arc;

use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::debug;

use super::CacheConfig;

/// Cache of records keyed by their exact unique name.
///
/// Fills are tagged with the write epoch observed before the store read.
/// Every invalidation bumps the epoch, so a fill racing a write is dropped
/// instead of caching the record the write replaced.
///
/// Cloning is cheap and shares the same underlying cache.
#[derive(Clone)]
pub struct RecordCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<String, V>,
    epoch: Arc<Mutex<u64>>,
    name: Arc<str>,
}

impl<V> RecordCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<Arc<str>>, config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            inner,
            epoch: Arc::new(Mutex::new(0)),
            name: name.into(),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let hit = self.inner.get(key);
        if hit.is_some() {
            debug!("Cache {} hit for [{}]", self.name, key);
        }
        hit
    }

    /// Current write epoch. Take it before reading the store.
    pub fn epoch(&self) -> u64 {
        *self.epoch.lock()
    }

    /// Cache `value` unless a write was invalidated since `epoch`.
    pub fn insert_if_current(&self, key: impl Into<String>, value: V, epoch: u64) -> bool {
        let current = self.epoch.lock();
        let key = key.into();
        if *current != epoch {
            debug!("Cache {} skipped stale fill for [{}]", self.name, key);
            return false;
        }
        self.inner.insert(key, value);
        true
    }

    /// Call after the write has reached the store.
    pub fn invalidate(&self, key: &str) {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        self.inner.invalidate(key);
    }

    pub fn invalidate_all(&self) {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        self.inner.invalidate_all();
        debug!("Cache {} cleared", self.name);
    }
}

impl<V> std::fmt::Debug for RecordCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCache")
            .field("name", &self.name)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}
