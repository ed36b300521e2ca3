use std::{
    ops::{Deref, DerefMut},
    sync::{Mutex, PoisonError},
};

pub const DEFAULT_MAX_IDLE: usize = 32;
pub const DEFAULT_MAX_CAPACITY: usize = 64 * 1024;

/// A pool of reusable output buffers.
///
/// Buffers are cleared when returned, so a checkout never sees output from an earlier render.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    /// The most buffers to keep around while idle
    max_idle: usize,
    /// Buffers that grew larger than this are dropped instead of returned.
    max_capacity: usize,
}

impl BufferPool {
    pub fn new(max_idle: usize, max_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_idle,
            max_capacity,
        }
    }

    pub fn checkout(&self) -> PooledBuffer<'_> {
        let buf = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();

        PooledBuffer { pool: self, buf }
    }

    /// The number of buffers currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() > self.max_capacity {
            return;
        }

        buf.clear();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.max_idle {
            free.push(buf);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE, DEFAULT_MAX_CAPACITY)
    }
}

/// A buffer checked out of a [BufferPool]. It goes back to the pool when dropped.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl<'a> Deref for PooledBuffer<'a> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<'a> DerefMut for PooledBuffer<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl<'a> Drop for PooledBuffer<'a> {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        self.pool.put(buf);
    }
}
