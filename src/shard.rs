use crate::iter::Halt;
use crate::stats::{ShardOps, ShardStats};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::hash::Hash;

/// A single map protected by one readers/writer lock.
///
/// Every read takes the lock in shared mode and every mutation takes it in
/// exclusive mode, so callers never synchronize externally. `ShardMap` is an
/// array of these, but a `LockedMap` is also usable on its own.
///
/// Callbacks passed to [`update`](Self::update) and
/// [`for_each_locked`](Self::for_each_locked) run with the lock held and must
/// not call back into the same map.
#[derive(Debug)]
pub struct LockedMap<K, V> {
    map: RwLock<HashMap<K, V>>,
    stats: ShardStats,
}

impl<K, V> LockedMap<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: RwLock::new(HashMap::with_capacity(capacity)),
            stats: ShardStats::new(),
        }
    }

    /// Assign `value` to `key`, replacing any previous value.
    pub fn set(&self, key: K, value: V) {
        self.stats.record_lock_acquisition();
        self.map.write().insert(key, value);
        self.stats.record_write();
    }

    /// Get the value for `key`, or `V::default()` when the key is absent.
    pub fn get(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.get_ok(key).unwrap_or_default()
    }

    /// Get a clone of the value for `key`, if present.
    pub fn get_ok(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.stats.record_lock_acquisition();
        let result = self.map.read().get(key).cloned();
        if result.is_some() {
            self.stats.record_read();
        }
        result
    }

    /// Check whether `key` is present.
    pub fn has(&self, key: &K) -> bool {
        self.stats.record_lock_acquisition();
        self.map.read().contains_key(key)
    }

    /// Remove `key` if present.
    pub fn delete(&self, key: &K) {
        let _ = self.remove(key);
    }

    /// Remove `key`, returning its value if it existed.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.stats.record_lock_acquisition();
        let result = self.map.write().remove(key);
        if result.is_some() {
            self.stats.record_remove();
        }
        result
    }

    /// Remove `key`, returning its value or `V::default()` if it was absent.
    pub fn delete_and_get(&self, key: &K) -> V
    where
        V: Default,
    {
        self.remove(key).unwrap_or_default()
    }

    /// Insert only if `key` is absent. Returns whether the insert happened.
    pub fn set_if_not_exists(&self, key: K, value: V) -> bool {
        self.stats.record_lock_acquisition();
        let mut map = self.map.write();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value);
        self.stats.record_write();
        true
    }

    /// Install `value` and return the previous value, or `V::default()` if
    /// the key was absent.
    pub fn swap(&self, key: K, value: V) -> V
    where
        V: Default,
    {
        self.stats.record_lock_acquisition();
        let old = self.map.write().insert(key, value);
        self.stats.record_write();
        old.unwrap_or_default()
    }

    /// Replace the value for `key` with `f(old)`, where `old` is the current
    /// value or `V::default()` if the key is absent. The result is always
    /// stored.
    ///
    /// `f` runs under the exclusive lock. Calling into this map from inside
    /// `f` deadlocks.
    pub fn update<F>(&self, key: K, f: F)
    where
        F: FnOnce(V) -> V,
        V: Default,
    {
        self.stats.record_lock_acquisition();
        let mut map = self.map.write();
        let slot = map.entry(key).or_default();
        *slot = f(std::mem::take(slot));
        self.stats.record_write();
    }

    /// Get the number of entries in this map.
    pub fn len(&self) -> usize {
        self.stats.record_lock_acquisition();
        self.map.read().len()
    }

    /// Check if this map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append every current key to `buf`.
    pub fn keys_into(&self, buf: &mut Vec<K>)
    where
        K: Clone,
    {
        self.stats.record_lock_acquisition();
        let map = self.map.read();
        buf.reserve(map.len());
        buf.extend(map.keys().cloned());
    }

    /// Visit every entry while holding the shared lock for the whole walk.
    ///
    /// Returns `Ok(())` after a full traversal, `Err(Halt::Break)` if `f`
    /// stopped early, and `Err(Halt::Err(e))` if `f` failed. Mutating this
    /// map from inside `f` deadlocks.
    pub fn for_each_locked<E, F>(&self, mut f: F) -> Result<(), Halt<E>>
    where
        F: FnMut(&K, &V) -> Result<(), Halt<E>>,
    {
        self.stats.record_lock_acquisition();
        let map = self.map.read();
        for (key, value) in map.iter() {
            f(key, value)?;
        }
        Ok(())
    }

    /// Visit every entry using a two-phase snapshot.
    ///
    /// The key set is copied into `keys` under one shared lock. Each key is
    /// then re-read under a short shared lock, and `f` is called with the
    /// lock released, so `f` may freely mutate the map. Keys removed after
    /// the snapshot are skipped, and values may be newer than the snapshot.
    /// `keys` is cleared before returning.
    pub fn for_each<E, F>(&self, keys: &mut Vec<K>, mut f: F) -> Result<(), Halt<E>>
    where
        K: Clone,
        V: Clone,
        F: FnMut(&K, &V) -> Result<(), Halt<E>>,
    {
        keys.clear();
        self.keys_into(keys);

        let result = self.visit_snapshot(keys, &mut f);
        keys.clear();
        result
    }

    fn visit_snapshot<E, F>(&self, keys: &[K], f: &mut F) -> Result<(), Halt<E>>
    where
        V: Clone,
        F: FnMut(&K, &V) -> Result<(), Halt<E>>,
    {
        for key in keys {
            self.stats.record_lock_acquisition();
            let value = match self.map.read().get(key) {
                Some(value) => value.clone(),
                None => continue,
            };
            f(key, &value)?;
        }
        Ok(())
    }

    /// Get a snapshot of statistics for this shard.
    pub fn stats(&self) -> ShardOps {
        self.stats.snapshot()
    }
}

impl<K, V> Default for LockedMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}
