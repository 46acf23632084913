use crate::error::Error;
use crate::hash::{KeyHasher, ShardHasher};
use std::hash::Hash;

/// Shard count used by `ShardMap::new` and when a requested count is zero.
pub const DEFAULT_SHARD_COUNT: usize = 1 << 8;

/// Check a requested shard count and return its shard mask. Zero means
/// "use the default".
///
/// The mask must fit in 32 bits: keys hash to `u32`, so shards past
/// `1 << 32` could never be selected.
pub(crate) fn shard_mask(requested: usize) -> Result<u32, Error> {
    let count = match requested {
        0 => DEFAULT_SHARD_COUNT,
        n if n.is_power_of_two() => n,
        n => return Err(Error::InvalidShardCount { requested: n }),
    };
    u32::try_from(count - 1).map_err(|_| Error::InvalidShardCount { requested })
}

/// Check a requested shard count. Zero means "use the default".
pub(crate) fn resolve_shard_count(requested: usize) -> Result<usize, Error> {
    shard_mask(requested).map(|mask| mask as usize + 1)
}

/// Configuration for a ShardMap instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) shard_count: usize,
    pub(crate) hash_function: ShardHasher,
    pub(crate) capacity_per_shard: Option<usize>,
}

impl Config {
    /// Create a new config with defaults (256 shards, ahash).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Must be a power of two; zero selects
    /// [`DEFAULT_SHARD_COUNT`].
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        self.shard_count = resolve_shard_count(count)?;
        Ok(self)
    }

    /// Set the built-in hash function to use.
    pub fn hash_function(mut self, hash_fn: ShardHasher) -> Self {
        self.hash_function = hash_fn;
        self
    }

    /// Set initial capacity per shard. Total capacity will be approximately
    /// `capacity_per_shard * shard_count`. Omitted by default.
    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.capacity_per_shard = Some(capacity);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            hash_function: ShardHasher::AHash,
            capacity_per_shard: None,
        }
    }
}

/// Builder for creating a ShardMap with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ShardMapBuilder {
    config: Config,
}

impl ShardMapBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Must be a power of two; zero selects
    /// [`DEFAULT_SHARD_COUNT`].
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.shard_count(count)?;
        Ok(self)
    }

    /// Set the built-in hash function to use.
    pub fn hash_function(mut self, hash_fn: ShardHasher) -> Self {
        self.config = self.config.hash_function(hash_fn);
        self
    }

    /// Set initial capacity per shard. Total capacity ≈ `capacity_per_shard * shard_count`.
    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.config = self.config.capacity_per_shard(capacity);
        self
    }

    /// Build a ShardMap that uses the configured built-in hash function.
    pub fn build<K, V>(self) -> Result<crate::ShardMap<K, V>, Error>
    where
        K: Hash + Eq,
    {
        crate::ShardMap::with_config(self.config)
    }

    /// Build a ShardMap that routes keys with a custom hasher, such as a
    /// `Fn(&K) -> u32` closure. The configured built-in hash function is
    /// ignored.
    pub fn build_with_hasher<K, V, H>(self, hasher: H) -> Result<crate::ShardMap<K, V, H>, Error>
    where
        K: Hash + Eq,
        H: KeyHasher<K>,
    {
        crate::ShardMap::from_parts(self.config, hasher)
    }
}
