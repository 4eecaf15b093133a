//! Little-endian byte primitives for OpenTTD packet bodies.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for the fixed-width
//! integers and NUL-terminated strings every packet field is built from.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked and never advance on failure.
//! - **No domain knowledge** - This crate knows nothing about packets, fields, or versions.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_u16(3977);
//! writer.write_cstr(b"admin");
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_u16().unwrap(), 3977);
//! assert_eq!(reader.read_cstr().unwrap(), b"admin");
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let bytes = ByteWriter::new().finish();
        assert!(bytes.is_empty());
        assert!(ByteReader::new(&bytes).is_empty());
    }

    #[test]
    fn mixed_roundtrip() {
        let mut writer = ByteWriter::new();
        writer.write_u8(0xFF);
        writer.write_i16(-300);
        writer.write_cstr(b"hello");
        writer.write_u64(u64::MAX);
        writer.write_bytes(&[9, 8, 7]);
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert_eq!(reader.read_i16().unwrap(), -300);
        assert_eq!(reader.read_cstr().unwrap(), b"hello");
        assert_eq!(reader.read_u64().unwrap(), u64::MAX);
        assert_eq!(reader.read_bytes(3).unwrap(), &[9, 8, 7]);
        assert!(reader.is_empty());
    }
}
