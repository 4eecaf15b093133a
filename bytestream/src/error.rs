//! Error types for byte stream operations.

use thiserror::Error;

/// Result type for byte stream operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur while reading packed little-endian data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    #[error("attempted to read {requested} bytes but only {available} bytes available")]
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A NUL-terminated string ran to the end of the buffer.
    #[error("string starting at offset {start} has no terminator")]
    MissingTerminator {
        /// Offset of the first string byte.
        start: usize,
    },
}
