use crate::cancel::CancelToken;
use crate::config::{shard_mask, Config, DEFAULT_SHARD_COUNT};
use crate::error::Error;
use crate::hash::{KeyHasher, ShardHasher};
use crate::iter::{self, Halt, Kv};
use crate::pool::KeyPool;
use crate::shard::LockedMap;
use crate::stats::{fractions, ShardOps, Stats};
use crossbeam_channel::{bounded, Receiver};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::thread;

/// Concurrent map split into independently locked shards.
///
/// Every key routes to exactly one shard, `hash(key) & (shard_count - 1)`,
/// and each shard is a [`LockedMap`] with its own readers/writer lock.
/// Operations on keys in different shards never contend. No operation holds
/// more than one shard lock at a time, so whole-map queries (`len`, `keys`,
/// iteration) see each shard at a different instant rather than one global
/// snapshot.
///
/// # Example
///
/// ```rust
/// use rwshard::ShardMap;
///
/// let map = ShardMap::new();
/// map.set("key1", 1);
///
/// assert_eq!(map.get_ok(&"key1"), Some(1));
/// assert_eq!(map.get(&"missing"), 0);
/// ```
pub struct ShardMap<K, V, H = ShardHasher> {
    shards: Box<[LockedMap<K, V>]>,
    shard_mask: u32,
    hash: H,
    keys_pool: KeyPool<K>,
}

impl<K, V> ShardMap<K, V>
where
    K: Hash + Eq,
{
    /// Create a new map with defaults (256 shards, ahash).
    pub fn new() -> Self {
        Self::build((DEFAULT_SHARD_COUNT - 1) as u32, None, ShardHasher::AHash)
    }

    /// Create a map with `shard_count` shards.
    ///
    /// `shard_count` must be a power of two. Zero selects the default of 256.
    ///
    /// ```rust
    /// use rwshard::{Error, ShardMap};
    ///
    /// let map = ShardMap::<u32, u32>::with_shards(0).unwrap();
    /// assert_eq!(map.num_shards(), 256);
    ///
    /// assert_eq!(
    ///     ShardMap::<u32, u32>::with_shards(3).unwrap_err(),
    ///     Error::InvalidShardCount { requested: 3 }
    /// );
    /// ```
    pub fn with_shards(shard_count: usize) -> Result<Self, Error> {
        Self::with_hasher(shard_count, ShardHasher::AHash)
    }

    /// Create a new map with custom config.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        let hash = config.hash_function;
        Self::from_parts(config, hash)
    }
}

impl<K, V, H> ShardMap<K, V, H>
where
    K: Hash + Eq,
    H: KeyHasher<K>,
{
    /// Create a map with `shard_count` shards that routes keys with `hasher`.
    ///
    /// The hasher must return the same value for the same key for as long
    /// as the map lives.
    ///
    /// ```rust
    /// use rwshard::ShardMap;
    ///
    /// let map: ShardMap<u32, &str, _> = ShardMap::with_hasher(4, |k: &u32| *k).unwrap();
    /// map.set(6, "six");
    /// assert_eq!(map.shard_index(&6), 2);
    /// ```
    pub fn with_hasher(shard_count: usize, hasher: H) -> Result<Self, Error> {
        let mask = shard_mask(shard_count)?;
        Ok(Self::build(mask, None, hasher))
    }

    pub(crate) fn from_parts(config: Config, hasher: H) -> Result<Self, Error> {
        let mask = shard_mask(config.shard_count)?;
        Ok(Self::build(mask, config.capacity_per_shard, hasher))
    }

    // The map has `shard_mask + 1` shards.
    fn build(shard_mask: u32, capacity_per_shard: Option<usize>, hash: H) -> Self {
        let shard_count = shard_mask as usize + 1;
        let capacity = capacity_per_shard.unwrap_or(0);
        let shards = (0..shard_count)
            .map(|_| LockedMap::with_capacity(capacity))
            .collect();

        Self {
            shards,
            shard_mask,
            hash,
            keys_pool: KeyPool::new(shard_count),
        }
    }

    /// Index of the shard `key` routes to.
    #[inline]
    pub fn shard_index(&self, key: &K) -> usize {
        (self.hash.hash_key(key) & self.shard_mask) as usize
    }

    /// The shard that holds (or would hold) `key`.
    #[inline]
    pub fn shard_for_key(&self, key: &K) -> &LockedMap<K, V> {
        &self.shards[self.shard_index(key)]
    }

    /// Number of shards. Fixed at construction.
    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Get the value for `key`, or `V::default()` if it is absent.
    pub fn get(&self, key: &K) -> V
    where
        V: Clone + Default,
    {
        self.shard_for_key(key).get(key)
    }

    /// Get a clone of the value for `key`, if present.
    pub fn get_ok(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.shard_for_key(key).get_ok(key)
    }

    /// Check whether `key` is present.
    pub fn has(&self, key: &K) -> bool {
        self.shard_for_key(key).has(key)
    }

    /// Assign `value` to `key`.
    pub fn set(&self, key: K, value: V) {
        self.shard_for_key(&key).set(key, value)
    }

    /// Insert only if `key` is absent. Returns whether the insert happened.
    ///
    /// ```rust
    /// use rwshard::ShardMap;
    ///
    /// let map = ShardMap::new();
    /// assert!(map.set_if_not_exists("k", "v1"));
    /// assert!(!map.set_if_not_exists("k", "v2"));
    /// assert_eq!(map.get(&"k"), "v1");
    /// ```
    pub fn set_if_not_exists(&self, key: K, value: V) -> bool {
        self.shard_for_key(&key).set_if_not_exists(key, value)
    }

    /// Remove `key` if present.
    pub fn delete(&self, key: &K) {
        self.shard_for_key(key).delete(key)
    }

    /// Remove `key`, returning its value if it existed.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.shard_for_key(key).remove(key)
    }

    /// Remove `key`, returning its value or `V::default()` if it was absent.
    pub fn delete_and_get(&self, key: &K) -> V
    where
        V: Default,
    {
        self.shard_for_key(key).delete_and_get(key)
    }

    /// Install `value` and return the previous value (or `V::default()`).
    ///
    /// ```rust
    /// use rwshard::ShardMap;
    ///
    /// let map = ShardMap::new();
    /// map.set("k", 10);
    /// assert_eq!(map.swap("k", 20), 10);
    /// assert_eq!(map.get(&"k"), 20);
    /// ```
    pub fn swap(&self, key: K, value: V) -> V
    where
        V: Default,
    {
        self.shard_for_key(&key).swap(key, value)
    }

    /// Store `f(old)` under `key`, where `old` is the current value or
    /// `V::default()`. The result is stored even for an absent key, so
    /// `update(k, |v| v)` inserts `V::default()` when `k` is missing.
    ///
    /// `f` runs while the key's shard is exclusively locked. It must not
    /// call any method of this map.
    ///
    /// ```rust
    /// use rwshard::ShardMap;
    ///
    /// let map = ShardMap::new();
    /// map.update("counter", |n: u64| n + 1);
    /// map.update("counter", |n| n + 1);
    /// assert_eq!(map.get(&"counter"), 2);
    /// ```
    pub fn update<F>(&self, key: K, f: F)
    where
        F: FnOnce(V) -> V,
        V: Default,
    {
        self.shard_for_key(&key).update(key, f)
    }

    /// Get the total number of entries across all shards.
    ///
    /// Shards are counted one after another, so under concurrent writes the
    /// total is not a point-in-time snapshot.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.is_empty())
    }

    /// Collect every key, in shard-index order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        for shard in self.shards.iter() {
            shard.keys_into(&mut out);
        }
        out
    }

    fn shard_sizes(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.len()).collect()
    }

    /// Fraction of all entries held by each shard, in shard-index order.
    ///
    /// Useful for judging how evenly a hash function spreads keys. Returns
    /// all zeros when the map is empty.
    pub fn shard_distribution(&self) -> Vec<f64> {
        fractions(&self.shard_sizes())
    }

    /// Get detailed statistics about the map and its shards.
    pub fn stats(&self) -> Stats {
        let shard_sizes = self.shard_sizes();
        let operations: Vec<ShardOps> = self.shards.iter().map(|s| s.stats()).collect();
        let size: usize = shard_sizes.iter().sum();

        Stats {
            size,
            shard_sizes,
            operations,
        }
    }

    /// Visit every entry, shard by shard, using snapshot traversal.
    ///
    /// Each shard's keys are copied first and every value is re-read just
    /// before `f` sees it; no lock is held while `f` runs, so `f` may mutate
    /// the map. Keys removed mid-walk are skipped.
    ///
    /// Returning `Err(Halt::Break)` from `f` stops the walk and yields
    /// `Ok(())`. `Err(Halt::Err(e))` stops it and yields `Err(e)`.
    ///
    /// ```rust
    /// use rwshard::{Halt, IterResult, ShardMap};
    ///
    /// let map = ShardMap::new();
    /// for i in 0..100 {
    ///     map.set(i, i);
    /// }
    ///
    /// let mut seen = 0;
    /// map.for_each(|_, _| -> IterResult {
    ///     seen += 1;
    ///     if seen == 10 {
    ///         return Err(Halt::Break);
    ///     }
    ///     Ok(())
    /// })
    /// .unwrap();
    /// assert_eq!(seen, 10);
    /// ```
    pub fn for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        K: Clone,
        V: Clone,
        F: FnMut(&K, &V) -> Result<(), Halt<E>>,
    {
        let mut keys = self.keys_pool.acquire();
        let result = self
            .shards
            .iter()
            .try_for_each(|shard| shard.for_each(&mut keys, &mut f));
        iter::finish(result)
    }

    /// Visit every entry, holding each shard's shared lock while that shard
    /// is walked.
    ///
    /// Only one shard is locked at a time. `f` must not mutate the map.
    /// Break and error handling match [`for_each`](Self::for_each).
    pub fn for_each_locked<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&K, &V) -> Result<(), Halt<E>>,
    {
        let result = self
            .shards
            .iter()
            .try_for_each(|shard| shard.for_each_locked(&mut f));
        iter::finish(result)
    }
}

impl<K, V, H> ShardMap<K, V, H>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    H: KeyHasher<K> + 'static,
{
    /// Stream every entry through a bounded channel of capacity `buffer`,
    /// using snapshot traversal on a background thread.
    ///
    /// The channel closes once the traversal finishes, `cancel` fires, or
    /// the receiver is dropped. A consumer that stops reading must do one of
    /// the latter two, or the producer thread blocks forever.
    ///
    /// ```rust
    /// use rwshard::{CancelToken, ShardMap};
    /// use std::sync::Arc;
    ///
    /// let map = Arc::new(ShardMap::new());
    /// map.set("a", 1);
    /// map.set("b", 2);
    ///
    /// let cancel = CancelToken::new();
    /// let mut total = 0;
    /// for kv in map.iter(&cancel, 4) {
    ///     total += kv.value;
    /// }
    /// assert_eq!(total, 3);
    /// ```
    pub fn iter(self: &Arc<Self>, cancel: &CancelToken, buffer: usize) -> Receiver<Kv<K, V>> {
        self.spawn_producer(cancel, buffer, false)
    }

    /// Like [`iter`](Self::iter), but walks each shard under its shared
    /// lock.
    ///
    /// While the producer is blocked on a full channel it still holds the
    /// current shard's lock, so writers to that shard wait until the
    /// consumer catches up or cancels.
    pub fn iter_locked(
        self: &Arc<Self>,
        cancel: &CancelToken,
        buffer: usize,
    ) -> Receiver<Kv<K, V>> {
        self.spawn_producer(cancel, buffer, true)
    }

    fn spawn_producer(
        self: &Arc<Self>,
        cancel: &CancelToken,
        buffer: usize,
        locked: bool,
    ) -> Receiver<Kv<K, V>> {
        let (tx, rx) = bounded(buffer);
        let map = Arc::clone(self);
        let cancel = cancel.clone();

        thread::spawn(move || {
            let send = iter::sender(&tx, &cancel);
            let result = if locked {
                map.for_each_locked(send)
            } else {
                map.for_each(send)
            };
            result.unwrap_or_else(|never| match never {});
        });

        rx
    }
}

impl<K, V> Default for ShardMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> fmt::Debug for ShardMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardMap")
            .field("num_shards", &self.shards.len())
            .finish_non_exhaustive()
    }
}
