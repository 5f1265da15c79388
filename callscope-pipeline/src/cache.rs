use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

/// Process-lifetime memo of derived metrics keyed by filter combination.
///
/// Entries are never invalidated: the source records are immutable after
/// load, so a computed value stays correct forever. Two threads missing on
/// the same key may both compute; the first insert wins and both values are
/// equivalent.
///
/// With a capacity set, a full cache still answers every request but stops
/// storing new keys.
pub struct MetricsCache<K, V> {
    capacity: Option<usize>,
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> MetricsCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Unbounded cache.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, computing it on a miss.
    pub fn get_or_compute<F>(&self, key: &K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        // Fast path: read-only lock for cache hits
        {
            let entries = self.entries.read().unwrap_or_else(|poisoned| {
                log::warn!("Metrics cache read lock was poisoned, recovering");
                poisoned.into_inner()
            });
            if let Some(v) = entries.get(key) {
                log::debug!("Metrics cache hit for {:?}", key);
                return Arc::clone(v);
            }
        }

        log::debug!("Metrics cache miss for {:?}", key);
        let value = Arc::new(compute());

        let mut entries = self.entries.write().unwrap_or_else(|poisoned| {
            log::warn!("Metrics cache write lock was poisoned, recovering");
            poisoned.into_inner()
        });
        if let Some(existing) = entries.get(key) {
            return Arc::clone(existing);
        }
        if self.capacity.is_some_and(|cap| entries.len() >= cap) {
            log::debug!(
                "Metrics cache full ({} entries), not storing {:?}",
                entries.len(),
                key
            );
            return value;
        }
        entries.insert(key.clone(), Arc::clone(&value));
        value
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| {
                log::warn!("Metrics cache read lock was poisoned during get, recovering");
                poisoned.into_inner()
            })
            .get(key)
            .map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| {
                log::warn!("Metrics cache read lock was poisoned during len, recovering");
                poisoned.into_inner()
            })
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for MetricsCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
