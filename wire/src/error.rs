//! Error types for frame operations.

use thiserror::Error;

/// Result type for frame decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Errors raised while splitting a byte stream into frames.
///
/// Any of these means the stream is no longer aligned on a frame boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The length field is smaller than the header itself.
    #[error("invalid frame length {length}: must be at least {min}")]
    InvalidLength {
        /// Length read from the header.
        length: usize,
        /// Minimum valid length.
        min: usize,
    },

    /// A configured limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        /// Which limit.
        kind: LimitKind,
        /// Configured limit.
        limit: usize,
        /// Observed value.
        actual: usize,
    },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Total frame size including the header.
    FrameBytes,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrameBytes => f.write_str("frame bytes"),
        }
    }
}

/// Errors that can occur while building a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// The body does not fit in a 16-bit length field.
    #[error("frame too large: {length} bytes, max {max}")]
    FrameTooLarge {
        /// Total frame length that was requested.
        length: usize,
        /// Largest representable frame.
        max: usize,
    },
}
