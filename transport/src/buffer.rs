//! Read accumulation with a take-and-restore swap.

use std::time::Instant;

use bytes::BytesMut;

/// Received bytes not yet consumed by a drain.
///
/// A drain [`take`](Self::take)s the accumulated bytes, leaving a fresh
/// buffer behind for anything that arrives meanwhile, and hands the
/// unconsumed tail back with [`restore`](Self::restore). The tail goes in
/// front of the newer bytes, so stream order is kept.
#[derive(Debug)]
pub struct ReadBuffer {
    bytes: BytesMut,
    last_activity: Instant,
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl ReadBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: BytesMut::with_capacity(capacity),
            last_activity: Instant::now(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// When bytes last arrived.
    #[must_use]
    pub const fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Appends received bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
        self.last_activity = Instant::now();
    }

    /// Takes all accumulated bytes.
    pub fn take(&mut self) -> BytesMut {
        self.bytes.split()
    }

    /// Returns an unconsumed tail ahead of any bytes added since `take`.
    pub fn restore(&mut self, mut tail: BytesMut) {
        if tail.is_empty() {
            return;
        }
        if !self.bytes.is_empty() {
            tail.extend_from_slice(&self.bytes);
        }
        self.bytes = tail;
    }

    /// Drops everything buffered.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    #[cfg(test)]
    pub(crate) fn set_last_activity(&mut self, at: Instant) {
        self.last_activity = at;
    }
}

impl AsRef<[u8]> for ReadBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_leaves_fresh_buffer() {
        let mut buffer = ReadBuffer::new();
        buffer.extend(b"abc");
        let taken = buffer.take();
        assert_eq!(&taken[..], b"abc");
        assert!(buffer.is_empty());
    }

    #[test]
    fn restore_keeps_order() {
        let mut buffer = ReadBuffer::new();
        buffer.extend(b"abcdef");
        let mut taken = buffer.take();
        let tail = taken.split_off(4);
        buffer.extend(b"gh");
        buffer.restore(tail);
        assert_eq!(buffer.as_ref(), b"efgh");
    }

    #[test]
    fn restore_empty_tail() {
        let mut buffer = ReadBuffer::new();
        buffer.extend(b"xy");
        let _ = buffer.take();
        buffer.extend(b"z");
        buffer.restore(BytesMut::new());
        assert_eq!(buffer.as_ref(), b"z");
    }

    #[test]
    fn extend_updates_activity() {
        let mut buffer = ReadBuffer::new();
        let before = buffer.last_activity();
        buffer.extend(b"a");
        assert!(buffer.last_activity() >= before);
        assert_eq!(buffer.len(), 1);
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
