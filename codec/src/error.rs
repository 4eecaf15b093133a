//! Error types for packet encoding and decoding.

use std::fmt;

use bytestream::ByteError;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a packet body.
///
/// Errors for which [`is_validation`](Self::is_validation) is `true` come
/// from bad caller input during encoding. All others mean a received body
/// does not match its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The body ended early or a string was unterminated.
    #[error("truncated body: {0}")]
    Bytes(#[from] ByteError),

    /// A value does not fit the field.
    #[error("invalid value for field {field:?}: {reason}")]
    InvalidValue { field: String, reason: ValueReason },

    /// A value has the wrong type for the field.
    #[error("field {field:?} expects {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A sequence or byte array has the wrong number of elements.
    #[error("field {field:?} needs exactly {expected} elements, found {actual}")]
    CountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Serialized JSON is not shorter than the field's limit.
    #[error("json for field {field:?} is {length} bytes, limit is {max}")]
    JsonTooLong {
        field: String,
        length: usize,
        max: usize,
    },

    /// A field validator rejected the value.
    #[error("field {field:?} failed validator {validator}")]
    Validator { field: String, validator: String },

    /// A received JSON field did not parse.
    #[error("field {field:?} holds invalid json: {message}")]
    InvalidJson { field: String, message: String },

    /// A configured limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Bytes were left over after the last field in strict mode.
    #[error("packet {packet}: {remaining} trailing bytes")]
    TrailingBytes { packet: String, remaining: usize },

    /// Abstract schemas cannot be encoded or decoded.
    #[error("packet {packet} is abstract")]
    AbstractSchema { packet: String },

    /// The encoded body does not fit in a frame.
    #[error("frame error: {0}")]
    Frame(#[from] wire::EncodeError),
}

impl CodecError {
    /// `true` for errors caused by the values handed to encode.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidValue { .. }
                | Self::TypeMismatch { .. }
                | Self::CountMismatch { .. }
                | Self::JsonTooLong { .. }
                | Self::Validator { .. }
        )
    }
}

/// Specific codec limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Elements in a repeating or looping field.
    SequenceLength,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SequenceLength => f.write_str("sequence length"),
        }
    }
}

/// Details for invalid value errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueReason {
    /// Integer outside the field's range.
    OutOfRange { min: i128, max: i128, value: i128 },
    /// String containing a NUL byte, which would end it early on the wire.
    InteriorNul { offset: usize },
    /// Date not representable as a day count.
    DateOutOfRange { days: i64 },
}

impl fmt::Display for ValueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { min, max, value } => {
                write!(f, "{value} outside {min}..={max}")
            }
            Self::InteriorNul { offset } => write!(f, "NUL byte at offset {offset}"),
            Self::DateOutOfRange { days } => write!(f, "day count {days} out of range"),
        }
    }
}
