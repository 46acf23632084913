use std::hash::{Hash, Hasher};

/// Maps a key to the 32-bit hash used for shard selection.
///
/// The result must be deterministic for the lifetime of the map: a key that
/// hashes differently between calls would be looked up in the wrong shard.
///
/// Any `Fn(&K) -> u32` closure is a `KeyHasher<K>`, so a custom hash can be
/// passed straight to [`ShardMap::with_hasher`](crate::ShardMap::with_hasher).
pub trait KeyHasher<K: ?Sized>: Send + Sync {
    /// Hash a key to a 32-bit value.
    fn hash_key(&self, key: &K) -> u32;
}

impl<K: ?Sized, F> KeyHasher<K> for F
where
    F: Fn(&K) -> u32 + Send + Sync,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u32 {
        self(key)
    }
}

/// Built-in hash functions for shard assignment.
/// Uses an enum so the default map type stays a concrete, nameable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShardHasher {
    /// AHash implementation (default, fast and well-distributed).
    #[default]
    AHash,
    /// FxHash implementation (faster but potentially less distributed).
    #[cfg(feature = "fxhash")]
    FxHash,
}

impl ShardHasher {
    /// Hash a key with the selected 64-bit hasher.
    pub fn hash64<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        match self {
            ShardHasher::AHash => {
                let mut hasher = ahash::AHasher::default();
                key.hash(&mut hasher);
                hasher.finish()
            }
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => {
                let mut hasher = fxhash::FxHasher::default();
                key.hash(&mut hasher);
                hasher.finish()
            }
        }
    }
}

impl<K: Hash + ?Sized> KeyHasher<K> for ShardHasher {
    #[inline]
    fn hash_key(&self, key: &K) -> u32 {
        fold(self.hash64(key))
    }
}

/// Fold a 64-bit hash into 32 bits so the high bits still reach the mask.
#[inline]
pub(crate) fn fold(hash: u64) -> u32 {
    (hash as u32) ^ ((hash >> 32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_hasher_is_stable() {
        let hasher = ShardHasher::default();
        let a = hasher.hash_key("some key");
        let b = hasher.hash_key("some key");
        assert_eq!(a, b);
    }

    #[test]
    fn test_closure_is_a_key_hasher() {
        let hasher = |k: &u32| k.wrapping_mul(31);
        assert_eq!(KeyHasher::<u32>::hash_key(&hasher, &2), 62);
    }

    #[test]
    fn test_fold_mixes_high_bits() {
        assert_eq!(fold(0x0000_0001_0000_0000), 1);
        assert_eq!(fold(0xffff_ffff_ffff_ffff), 0);
    }
}
