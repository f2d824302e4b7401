use crate::errors::DbResult;
use crate::key::{Column, DbKey};
use crate::kv::{KeyValueStore, WriteBatch};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Least-recently-used cache for small workloads. Eviction scans for the
/// oldest entry, so the capacity is meant to stay in the thousands.
pub struct LruCache<K, V> {
    capacity: usize,
    cache: RwLock<HashMap<K, CacheEntry<V>>>,
    clock: AtomicU64,
}

struct CacheEntry<V> {
    value: V,
    last_access: u64,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, cache: RwLock::new(HashMap::with_capacity(capacity)), clock: AtomicU64::new(0) }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.cache.write();
        let entry = cache.get_mut(key)?;
        entry.last_access = self.tick();
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        let mut cache = self.cache.write();
        if cache.len() >= self.capacity && !cache.contains_key(&key) {
            let oldest = cache.iter().min_by_key(|(_, entry)| entry.last_access).map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                cache.remove(&oldest);
            }
        }
        cache.insert(key, CacheEntry { value, last_access: self.tick() });
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.cache.write().remove(key).map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}

/// Read cache in front of any backend. Values enter the cache on read misses
/// and are refreshed by successful writes, so it never serves stale data.
///
/// A miss reads the backend and fills the cache while holding `fill` shared,
/// and writes hold it exclusively, so a value read before a write can never be
/// cached after that write.
pub struct CachedKeyValueStore<S> {
    inner: S,
    cache: LruCache<DbKey, Vec<u8>>,
    fill: RwLock<()>,
}

impl<S: KeyValueStore> CachedKeyValueStore<S> {
    pub fn new(inner: S, capacity: usize) -> Self {
        Self { inner, cache: LruCache::new(capacity), fill: RwLock::new(()) }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: KeyValueStore> KeyValueStore for CachedKeyValueStore<S> {
    fn get(&self, key: &DbKey) -> DbResult<Option<Vec<u8>>> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value));
        }
        let _fill = self.fill.read();
        let value = self.inner.get(key)?;
        if let Some(value) = &value {
            self.cache.insert(key.clone(), value.clone());
        }
        Ok(value)
    }

    fn iterate(&self, column: Column) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.inner.iterate(column)
    }

    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        let updates: Vec<(DbKey, Option<Vec<u8>>)> =
            batch.iter().map(|(key, value)| (key.clone(), value.map(|v| v.to_vec()))).collect();
        let _fill = self.fill.write();
        self.inner.write(batch)?;
        for (key, value) in updates {
            match value {
                Some(value) => self.cache.insert(key, value),
                None => {
                    self.cache.remove(&key);
                }
            }
        }
        Ok(())
    }
}
