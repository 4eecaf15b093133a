//! Byte-level writer for packed little-endian data.

/// An append-only little-endian writer.
///
/// Writes are accumulated in an internal buffer. Call [`finish`](Self::finish)
/// to take the bytes.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

macro_rules! write_le {
    ($(#[$doc:meta] $name:ident => $ty:ty),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name(&mut self, value: $ty) {
                self.bytes.extend_from_slice(&value.to_le_bytes());
            }
        )*
    };
}

impl ByteWriter {
    /// Creates a new empty `ByteWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ByteWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    write_le! {
        /// Writes a `u8`.
        write_u8 => u8,
        /// Writes an `i8`.
        write_i8 => i8,
        /// Writes a little-endian `u16`.
        write_u16 => u16,
        /// Writes a little-endian `i16`.
        write_i16 => i16,
        /// Writes a little-endian `u32`.
        write_u32 => u32,
        /// Writes a little-endian `i32`.
        write_i32 => i32,
        /// Writes a little-endian `u64`.
        write_u64 => u64,
        /// Writes a little-endian `i64`.
        write_i64 => i64,
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Writes `bytes` followed by a NUL terminator.
    ///
    /// The caller is responsible for ensuring `bytes` has no interior NUL.
    pub fn write_cstr(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
        self.bytes.push(0);
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        buf.append(&mut self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writer() {
        let writer = ByteWriter::new();
        assert!(writer.is_empty());
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn integers_are_little_endian() {
        let mut writer = ByteWriter::new();
        writer.write_u16(0x1234);
        writer.write_i32(-2);
        assert_eq!(writer.finish(), vec![0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn cstr_appends_terminator() {
        let mut writer = ByteWriter::with_capacity(8);
        writer.write_cstr(b"ab");
        writer.write_cstr(b"");
        assert_eq!(writer.as_slice(), b"ab\0\0");
        assert_eq!(writer.len(), 4);
    }

    #[test]
    fn finish_into_appends() {
        let mut writer = ByteWriter::new();
        writer.write_u8(7);
        let mut buf = vec![1, 2];
        writer.finish_into(&mut buf);
        assert_eq!(buf, vec![1, 2, 7]);
    }
}
