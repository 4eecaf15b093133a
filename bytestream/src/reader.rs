//! Byte-level reader with bounded operations.

use crate::error::{ByteError, ByteResult};

/// A little-endian reader over a borrowed byte slice.
///
/// All read operations are bounds-checked and return errors on failure.
/// A failed read never advances the position.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_le {
    ($(#[$doc:meta] $name:ident => $ty:ty, $n:literal),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name(&mut self) -> ByteResult<$ty> {
                let bytes = self.read_array::<$n>()?;
                Ok(<$ty>::from_le_bytes(bytes))
            }
        )*
    };
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the unread tail without consuming it.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    read_le! {
        /// Reads a `u8`.
        read_u8 => u8, 1,
        /// Reads an `i8`.
        read_i8 => i8, 1,
        /// Reads a little-endian `u16`.
        read_u16 => u16, 2,
        /// Reads a little-endian `i16`.
        read_i16 => i16, 2,
        /// Reads a little-endian `u32`.
        read_u32 => u32, 4,
        /// Reads a little-endian `i32`.
        read_i32 => i32, 4,
        /// Reads a little-endian `u64`.
        read_u64 => u64, 8,
        /// Reads a little-endian `i64`.
        read_i64 => i64, 8,
    }

    /// Reads exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> ByteResult<&'a [u8]> {
        self.ensure(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads a NUL-terminated string, returning the bytes before the terminator.
    ///
    /// The terminator is consumed but not returned.
    pub fn read_cstr(&mut self) -> ByteResult<&'a [u8]> {
        let start = self.pos;
        let Some(nul) = self.data[start..].iter().position(|&b| b == 0) else {
            return Err(ByteError::MissingTerminator { start });
        };
        let out = &self.data[start..start + nul];
        self.pos = start + nul + 1;
        Ok(out)
    }

    /// Skips `len` bytes.
    pub fn skip(&mut self, len: usize) -> ByteResult<()> {
        self.ensure(len)?;
        self.pos += len;
        Ok(())
    }

    fn ensure(&self, len: usize) -> ByteResult<()> {
        let available = self.remaining();
        if len > available {
            return Err(ByteError::UnexpectedEof {
                requested: len,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}
