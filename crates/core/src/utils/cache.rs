//! Caller-injected cache abstraction.
//!
//! Resolver-style lookups (symbol classification, etc.) memoize through this
//! trait instead of a module-level singleton, so ownership and lifetime of
//! the cached state stay with the caller.

use dashmap::DashMap;

/// Minimal get/set/expire contract for injected caches.
pub trait CacheTrait<V: Clone + Send + Sync>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V);
    fn expire(&self, key: &str);
}

/// In-process cache backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryCache<V> {
    entries: DashMap<String, V>,
}

impl<V: Clone + Send + Sync> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone + Send + Sync> CacheTrait<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: V) {
        self.entries.insert(key.to_string(), value);
    }

    fn expire(&self, key: &str) {
        self.entries.remove(key);
    }
}
