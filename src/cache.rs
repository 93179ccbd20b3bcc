//! Bounded in-memory caches injected into the context analyzer and the agent
//! catalog loader.
//!
//! Backed by `moka::sync::Cache`: size-bounded (entry count), TinyLFU
//! admission with LRU eviction, safe to share across threads. Concurrent
//! misses on the same key may both compute and insert; the last insert wins.
//! Entries live for the lifetime of the cache object only.

use moka::sync::Cache;
use std::hash::Hash;

pub const DEFAULT_CAPACITY: u64 = 64;

#[derive(Clone)]
pub struct BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
    capacity: u64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Return the cached value or compute, store and return a fresh one.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.inner.get(&key) {
            return hit;
        }
        let value = compute();
        self.inner.insert(key, value.clone());
        value
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate entry count after flushing pending maintenance.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
