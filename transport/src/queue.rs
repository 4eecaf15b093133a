//! Bounded outbound queue shared between producers and the flushing side.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A bounded FIFO of pending outbound chunks.
///
/// Producers block in [`push`](Self::push) while the queue is full. The
/// flushing side pops from the front and may put an unsent remainder back
/// with [`push_front`](Self::push_front), which ignores the capacity so a
/// partial write can never deadlock against waiting producers.
#[derive(Debug)]
pub struct OutboundQueue<T = Vec<u8>> {
    chunks: Mutex<VecDeque<T>>,
    not_full: Condvar,
    capacity: usize,
}

impl<T> OutboundQueue<T> {
    /// Creates a queue holding at most `capacity` chunks (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: Mutex::new(VecDeque::new()),
            not_full: Condvar::new(),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.lock().is_empty()
    }

    /// Appends a chunk, blocking while the queue is full.
    pub fn push(&self, chunk: T) {
        let mut chunks = self.chunks.lock();
        while chunks.len() >= self.capacity {
            self.not_full.wait(&mut chunks);
        }
        chunks.push_back(chunk);
    }

    /// Appends a chunk, handing it back if the queue is full.
    pub fn try_push(&self, chunk: T) -> Result<(), T> {
        let mut chunks = self.chunks.lock();
        if chunks.len() >= self.capacity {
            return Err(chunk);
        }
        chunks.push_back(chunk);
        Ok(())
    }

    /// Appends a chunk, waiting up to `timeout` for space.
    pub fn push_timeout(&self, chunk: T, timeout: Duration) -> Result<(), T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.push(chunk);
            return Ok(());
        };
        let mut chunks = self.chunks.lock();
        while chunks.len() >= self.capacity {
            if self.not_full.wait_until(&mut chunks, deadline).timed_out()
                && chunks.len() >= self.capacity
            {
                return Err(chunk);
            }
        }
        chunks.push_back(chunk);
        Ok(())
    }

    /// Puts a chunk back at the head of the queue.
    pub fn push_front(&self, chunk: T) {
        self.chunks.lock().push_front(chunk);
    }

    /// Takes the chunk at the head of the queue.
    pub fn pop(&self) -> Option<T> {
        let chunk = self.chunks.lock().pop_front();
        if chunk.is_some() {
            self.not_full.notify_one();
        }
        chunk
    }

    /// Drops every pending chunk, returning how many there were.
    pub fn clear(&self) -> usize {
        let dropped = {
            let mut chunks = self.chunks.lock();
            let n = chunks.len();
            chunks.clear();
            n
        };
        self.not_full.notify_all();
        dropped
    }
}
