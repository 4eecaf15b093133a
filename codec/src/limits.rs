//! Limits for codec-level decoding.

/// Codec limits enforced while decoding packet bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecLimits {
    /// Maximum elements in one repeating or looping field.
    pub max_sequence_len: usize,
    /// Whether bytes left after the last field are ignored.
    pub allow_trailing_bytes: bool,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_sequence_len: 4096,
            allow_trailing_bytes: true,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_sequence_len: 64,
            allow_trailing_bytes: false,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_sequence_len: usize::MAX,
            allow_trailing_bytes: true,
        }
    }

    /// Default limits that reject trailing body bytes.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_sequence_len: 4096,
            allow_trailing_bytes: false,
        }
    }
}
