use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// A keyed cache with monotonic wall-clock expiration. Eviction is
/// time-based only; concurrent misses for the same key may both
/// compute a fresh value, and the last writer wins.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (V, Instant)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, HashMap<K, (V, Instant)>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<K, (V, Instant)>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let guard = self.read_guard();
        guard.get(key).and_then(|(value, inserted_at)| {
            if inserted_at.elapsed() < self.ttl {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn put(&self, key: K, value: V) {
        self.write_guard().insert(key, (value, Instant::now()));
    }

    /// Returns the cached value if fresh, else calls `produce` and
    /// caches the result. `produce` may run concurrently for the same
    /// key under different callers; the last insert wins.
    pub fn get_or_insert_with<F>(&self, key: K, produce: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let value = produce();
        self.put(key.clone(), value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
