//! Socket configuration.

use std::time::Duration;

use codec::CodecLimits;
use wire::Limits;

/// Buffering and limit settings shared by stream and datagram sockets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportConfig {
    /// Bytes requested from the stream per `fill`.
    pub read_chunk_size: usize,
    /// Chunks the outbound queue holds before writers block.
    pub queue_capacity: usize,
    /// Chunks written per `flush` call.
    pub max_frames_per_flush: usize,
    /// Datagram peers idle for longer than this are evicted.
    pub peer_idle_timeout: Duration,
    pub wire_limits: Limits,
    pub codec_limits: CodecLimits,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 4096,
            queue_capacity: 256,
            max_frames_per_flush: 16,
            peer_idle_timeout: Duration::from_secs(30),
            wire_limits: Limits::default(),
            codec_limits: CodecLimits::default(),
        }
    }
}

impl TransportConfig {
    /// Creates a configuration suitable for testing with smaller values.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            read_chunk_size: 64,
            queue_capacity: 8,
            max_frames_per_flush: 4,
            peer_idle_timeout: Duration::from_millis(100),
            wire_limits: Limits::for_testing(),
            codec_limits: CodecLimits::for_testing(),
        }
    }

    /// Creates a configuration with no restrictions (use with caution).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            read_chunk_size: 64 * 1024,
            queue_capacity: usize::MAX,
            max_frames_per_flush: usize::MAX,
            peer_idle_timeout: Duration::MAX,
            wire_limits: Limits::unlimited(),
            codec_limits: CodecLimits::unlimited(),
        }
    }
}
