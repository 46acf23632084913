use thiserror::Error;

/// Errors that can occur when building a ShardMap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The shard count is invalid (must be a power of two).
    #[error("shard count must be a power of two, got {requested}")]
    InvalidShardCount {
        /// The rejected shard count.
        requested: usize,
    },
}
