//! Process-wide free list for reader buffers.
//!
//! Acquire/release may be called from any number of threads with no
//! ordering guarantees. The pool keeps at most [`POOL_LIMIT`] buffers;
//! anything beyond that is dropped, so callers must not rely on a released
//! buffer ever being reused.

use std::sync::{Mutex, PoisonError};

pub(crate) const DEFAULT_BUFFER_CAPACITY: usize = 128;
const POOL_LIMIT: usize = 64;

static POOL: Mutex<Vec<Vec<u8>>> = Mutex::new(Vec::new());

pub(crate) fn acquire_buffer() -> Vec<u8> {
    let pooled = POOL
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop();
    pooled.unwrap_or_else(|| Vec::with_capacity(DEFAULT_BUFFER_CAPACITY))
}

pub(crate) fn release_buffer(mut buffer: Vec<u8>) {
    buffer.fill(0);
    buffer.clear();
    let mut pool = POOL.lock().unwrap_or_else(PoisonError::into_inner);
    if pool.len() < POOL_LIMIT {
        pool.push(buffer);
    }
}
