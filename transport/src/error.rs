//! Error types for packet sockets.

use std::io;

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that end or interrupt a connection.
///
/// Every variant except [`Encode`](Self::Encode) and
/// [`QueueFull`](Self::QueueFull) leaves the socket disconnected.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The underlying read or write failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the connection, or an earlier error did.
    #[error("connection closed")]
    Disconnected,

    /// A frame header was corrupt; the stream cannot be resynchronised.
    #[error("framing error: {0}")]
    Framing(#[from] wire::DecodeError),

    /// A packet could not be encoded. The connection is unaffected.
    #[error("encode failed: {0}")]
    Encode(#[from] codec::CodecError),

    /// The outbound queue had no room. Carries the encoded frame so the
    /// caller can flush and retry.
    #[error("outbound queue full ({} byte frame)", frame.len())]
    QueueFull { frame: Vec<u8> },
}

impl TransportError {
    /// `true` if the connection can no longer be used.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Encode(_) | Self::QueueFull { .. })
    }
}
