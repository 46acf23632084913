//! Reusable key buffers for snapshot traversal.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// Upper bound on idle buffers kept by a pool.
pub(crate) const MAX_POOLED: usize = 64;

/// Buffers that grew past this many keys are dropped instead of pooled.
pub(crate) const MAX_RETAINED_CAPACITY: usize = 1 << 16;

/// A thread-safe free list of key buffers.
///
/// Snapshot traversal copies every key of a shard into a buffer. Reusing
/// buffers across calls keeps that copy from allocating on every traversal.
#[derive(Debug)]
pub(crate) struct KeyPool<K> {
    free: Mutex<Vec<Vec<K>>>,
    initial_capacity: usize,
}

impl<K> KeyPool<K> {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            initial_capacity,
        }
    }

    /// Take a buffer from the pool, or allocate a fresh one.
    pub fn acquire(&self) -> PooledKeys<'_, K> {
        let buf = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.initial_capacity));
        PooledKeys { pool: self, buf }
    }

    fn release(&self, mut buf: Vec<K>) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < MAX_POOLED {
            free.push(buf);
        }
    }

    #[cfg(test)]
    fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

/// A buffer checked out of a [`KeyPool`]. Returned to the pool on drop.
pub(crate) struct PooledKeys<'a, K> {
    pool: &'a KeyPool<K>,
    buf: Vec<K>,
}

impl<K> Deref for PooledKeys<'_, K> {
    type Target = Vec<K>;

    fn deref(&self) -> &Vec<K> {
        &self.buf
    }
}

impl<K> DerefMut for PooledKeys<'_, K> {
    fn deref_mut(&mut self) -> &mut Vec<K> {
        &mut self.buf
    }
}

impl<K> Drop for PooledKeys<'_, K> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
