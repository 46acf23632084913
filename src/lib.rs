//! # rwshard
//!
//! A concurrent map that scales across cores by sharding.
//!
//! The map is split into a fixed, power-of-two number of shards. Each shard
//! is a plain hash map behind its own readers/writer lock, and every key
//! routes to exactly one shard via `hash(key) & (shard_count - 1)`.
//! Operations on different shards never block each other, and no operation
//! ever holds two shard locks at once.
//!
//! ## Features
//!
//! - **Point operations**: `get`, `get_ok`, `has`, `set`, `set_if_not_exists`,
//!   `delete`, `delete_and_get`, `swap`, `update`
//! - **Two traversals**: snapshot (`for_each`, safe to mutate from the
//!   callback) and locked (`for_each_locked`, faster, read-only)
//! - **Channel iteration**: `iter` / `iter_locked` stream entries over a
//!   bounded channel with a [`CancelToken`]
//! - **Pluggable hashing**: built-in ahash (or fxhash), or any
//!   `Fn(&K) -> u32`
//! - **Introspection**: `shard_distribution`, `stats`, and per-shard
//!   counters behind the `metrics` feature
//!
//! ## Example
//!
//! ```rust
//! use rwshard::{Halt, IterResult, ShardMap};
//!
//! let map = ShardMap::new();
//!
//! map.set("a", 1);
//! map.set("b", 2);
//! map.set("a", 3);
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get_ok(&"a"), Some(3));
//! assert_eq!(map.get_ok(&"c"), None);
//!
//! // Absent keys read as the value type's default.
//! assert_eq!(map.get(&"c"), 0);
//!
//! let mut sum = 0;
//! map.for_each(|_, v| -> IterResult {
//!     sum += *v;
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(sum, 5);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use rwshard::{ShardHasher, ShardMapBuilder};
//!
//! let map = ShardMapBuilder::new()
//!     .shard_count(32)?  // Must be power of two
//!     .hash_function(ShardHasher::AHash)
//!     .build::<String, i32>()?;
//! # Ok::<(), rwshard::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Cancellation token for channel iteration.
pub mod cancel;
/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Hash function implementations.
pub mod hash;
/// Iteration control values and channel iteration types.
pub mod iter;
mod pool;
/// The per-shard locked map.
pub mod shard;
/// Main ShardMap implementation.
pub mod shardmap;
/// Statistics and metrics collection.
pub mod stats;

// Re-export main types
pub use cancel::CancelToken;
pub use config::{Config, ShardMapBuilder, DEFAULT_SHARD_COUNT};
pub use error::Error;
pub use hash::{KeyHasher, ShardHasher};
pub use iter::{Halt, IterResult, Kv};
pub use shard::LockedMap;
pub use shardmap::ShardMap;
pub use stats::{ShardOps, Stats};
