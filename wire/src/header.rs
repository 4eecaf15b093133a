//! Frame header type and constants.

/// Header size in bytes: u16 length + u8 packet id.
pub const HEADER_SIZE: usize = 2 + 1;

/// Largest frame the 16-bit length field can describe.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// The fixed header in front of every frame.
///
/// `length` counts the whole frame, header included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    pub length: u16,
    pub packet_id: u8,
}

impl FrameHeader {
    /// Creates a header.
    #[must_use]
    pub const fn new(length: u16, packet_id: u8) -> Self {
        Self { length, packet_id }
    }

    /// Reads a header from the start of `buf` without validating the length.
    ///
    /// Returns `None` if fewer than [`HEADER_SIZE`] bytes are available.
    #[must_use]
    pub fn peek(buf: &[u8]) -> Option<Self> {
        match buf {
            [lo, hi, packet_id, ..] => Some(Self {
                length: u16::from_le_bytes([*lo, *hi]),
                packet_id: *packet_id,
            }),
            _ => None,
        }
    }

    /// Returns the total frame length as a `usize`.
    #[must_use]
    pub const fn frame_len(self) -> usize {
        self.length as usize
    }

    /// Returns the body length, or `None` if `length` is below the header size.
    #[must_use]
    pub const fn body_len(self) -> Option<usize> {
        self.frame_len().checked_sub(HEADER_SIZE)
    }

    /// Encodes the header into its 3-byte wire form.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let len = self.length.to_le_bytes();
        [len[0], len[1], self.packet_id]
    }
}
