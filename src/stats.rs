//! Statistics and diagnostics types.

#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-shard operation statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardOps {
    /// Number of read operations that found their key.
    pub reads: u64,
    /// Number of write operations (sets, swaps, updates, first-time inserts).
    pub writes: u64,
    /// Number of remove operations that removed an entry.
    pub removes: u64,
    /// Number of lock acquisitions, shared or exclusive (0 when metrics feature disabled).
    pub lock_acquisitions: u64,
}

/// Thread-safe statistics tracker for a single shard.
#[cfg(feature = "metrics")]
#[derive(Debug)]
pub(crate) struct ShardStats {
    reads: AtomicU64,
    writes: AtomicU64,
    removes: AtomicU64,
    lock_acquisitions: AtomicU64,
}

#[cfg(feature = "metrics")]
impl ShardStats {
    pub fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            removes: AtomicU64::new(0),
            lock_acquisitions: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_lock_acquisition(&self) {
        self.lock_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ShardOps {
        ShardOps {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            lock_acquisitions: self.lock_acquisitions.load(Ordering::Relaxed),
        }
    }
}

/// Zero-sized placeholder when metrics are disabled.
#[cfg(not(feature = "metrics"))]
#[derive(Debug)]
pub(crate) struct ShardStats;

#[cfg(not(feature = "metrics"))]
impl ShardStats {
    pub fn new() -> Self {
        ShardStats
    }

    #[inline]
    pub fn record_read(&self) {}

    #[inline]
    pub fn record_write(&self) {}

    #[inline]
    pub fn record_remove(&self) {}

    #[inline]
    pub fn record_lock_acquisition(&self) {}

    pub fn snapshot(&self) -> ShardOps {
        ShardOps::default()
    }
}

impl Default for ShardStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Each shard's share of the total, from one read of every shard size.
/// All zeros when the total is zero.
pub(crate) fn fractions(shard_sizes: &[usize]) -> Vec<f64> {
    let total: usize = shard_sizes.iter().sum();
    if total == 0 {
        return vec![0.0; shard_sizes.len()];
    }
    let total = total as f64;
    shard_sizes.iter().map(|&n| n as f64 / total).collect()
}

/// Aggregate statistics for a ShardMap instance.
///
/// Shards are read one after another, so under concurrent writes the
/// figures are a composition of per-shard snapshots, not a global one.
#[derive(Debug, Clone)]
pub struct Stats {
    /// Total number of entries across all shards.
    pub size: usize,
    /// Number of entries in each shard.
    pub shard_sizes: Vec<usize>,
    /// Operation counts for each shard.
    pub operations: Vec<ShardOps>,
}

impl Stats {
    /// Fraction of all entries held by each shard.
    ///
    /// Returns a zero vector when the map is empty.
    pub fn distribution(&self) -> Vec<f64> {
        fractions(&self.shard_sizes)
    }

    /// Largest shard size divided by the mean shard size. 1.0 is perfectly even.
    pub fn max_load_ratio(&self) -> f64 {
        if self.size == 0 || self.shard_sizes.is_empty() {
            return 0.0;
        }
        let avg = self.size as f64 / self.shard_sizes.len() as f64;
        let max = self.shard_sizes.iter().copied().max().unwrap_or(0) as f64;
        max / avg
    }
}
