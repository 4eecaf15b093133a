//! Frame splitting and encoding.

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::header::{FrameHeader, HEADER_SIZE, MAX_FRAME_LEN};
use crate::limits::Limits;

/// One complete frame borrowed from a receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    pub body: &'a [u8],
}

impl Frame<'_> {
    /// Returns the numeric packet id.
    #[must_use]
    pub const fn packet_id(&self) -> u8 {
        self.header.packet_id
    }

    /// Returns the number of buffer bytes this frame occupies.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.header.frame_len()
    }

    /// Always `false`: a frame holds at least its header.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Reads the header at the start of `buf` without consuming anything.
///
/// Returns `None` while fewer than [`HEADER_SIZE`] bytes are buffered.
#[must_use]
pub fn peek_header(buf: &[u8]) -> Option<FrameHeader> {
    FrameHeader::peek(buf)
}

/// Decodes the frame at the start of `buf`.
///
/// Returns `Ok(None)` when the header or body is still incomplete. A length
/// below the header size or above `limits` is an error: the stream cannot
/// be resynchronised after it.
pub fn decode_frame<'a>(buf: &'a [u8], limits: &Limits) -> WireResult<Option<Frame<'a>>> {
    let Some(header) = FrameHeader::peek(buf) else {
        return Ok(None);
    };
    let length = header.frame_len();
    if length < HEADER_SIZE {
        return Err(DecodeError::InvalidLength {
            length,
            min: HEADER_SIZE,
        });
    }
    if length > limits.max_frame_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::FrameBytes,
            limit: limits.max_frame_bytes,
            actual: length,
        });
    }
    if buf.len() < length {
        return Ok(None);
    }
    Ok(Some(Frame {
        header,
        body: &buf[HEADER_SIZE..length],
    }))
}

/// Iterates over the complete frames at the front of a buffer.
///
/// Iteration stops at the first incomplete frame, or after yielding the
/// first framing error. [`consumed`](Self::consumed) reports how many bytes
/// the yielded frames covered; everything after that must be kept.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    buf: &'a [u8],
    offset: usize,
    limits: &'a Limits,
    done: bool,
}

impl<'a> Frames<'a> {
    #[must_use]
    pub const fn new(buf: &'a [u8], limits: &'a Limits) -> Self {
        Self {
            buf,
            offset: 0,
            limits,
            done: false,
        }
    }

    /// Bytes covered by the frames yielded so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.offset
    }

    /// The bytes not yet consumed.
    #[must_use]
    pub fn remainder(&self) -> &'a [u8] {
        &self.buf[self.offset..]
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = WireResult<Frame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode_frame(&self.buf[self.offset..], self.limits) {
            Ok(Some(frame)) => {
                self.offset += frame.len();
                Some(Ok(frame))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Splits `buf` into frames. See [`Frames`].
#[must_use]
pub const fn frames<'a>(buf: &'a [u8], limits: &'a Limits) -> Frames<'a> {
    Frames::new(buf, limits)
}

/// Returns the header for a frame carrying `body_len` body bytes.
pub fn frame_header(packet_id: u8, body_len: usize) -> Result<FrameHeader, EncodeError> {
    let length = body_len.saturating_add(HEADER_SIZE);
    let length = u16::try_from(length).map_err(|_| EncodeError::FrameTooLarge {
        length,
        max: MAX_FRAME_LEN,
    })?;
    Ok(FrameHeader::new(length, packet_id))
}

/// Appends a complete frame to `out`, returning the number of bytes written.
pub fn encode_frame(packet_id: u8, body: &[u8], out: &mut Vec<u8>) -> Result<usize, EncodeError> {
    let header = frame_header(packet_id, body.len())?;
    out.reserve(header.frame_len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(body);
    Ok(header.frame_len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(packet_id: u8, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_frame(packet_id, body, &mut out).unwrap();
        out
    }

    #[test]
    fn encode_prefixes_total_length() {
        let bytes = frame_bytes(0x10, &[1, 2, 3, 4]);
        assert_eq!(bytes, vec![0x07, 0x00, 0x10, 1, 2, 3, 4]);
    }

    #[test]
    fn encode_empty_body() {
        assert_eq!(frame_bytes(5, &[]), vec![0x03, 0x00, 0x05]);
    }

    #[test]
    fn encode_rejects_oversized_body() {
        let body = vec![0u8; MAX_FRAME_LEN - HEADER_SIZE + 1];
        let mut out = Vec::new();
        let err = encode_frame(1, &body, &mut out).unwrap_err();
        assert_eq!(
            err,
            EncodeError::FrameTooLarge {
                length: MAX_FRAME_LEN + 1,
                max: MAX_FRAME_LEN
            }
        );
        assert!(out.is_empty());
    }

    #[test]
    fn encode_accepts_maximum_body() {
        let body = vec![0u8; MAX_FRAME_LEN - HEADER_SIZE];
        let mut out = Vec::new();
        assert_eq!(encode_frame(1, &body, &mut out).unwrap(), MAX_FRAME_LEN);
    }

    #[test]
    fn decode_waits_for_header() {
        assert_eq!(decode_frame(&[0x05], &Limits::default()).unwrap(), None);
    }

    #[test]
    fn decode_waits_for_body() {
        let bytes = frame_bytes(1, &[9, 9, 9]);
        let partial = &bytes[..bytes.len() - 1];
        assert_eq!(decode_frame(partial, &Limits::default()).unwrap(), None);
    }

    #[test]
    fn decode_complete_frame() {
        let mut bytes = frame_bytes(0x2A, &[1, 2]);
        bytes.extend_from_slice(&[0xEE]);
        let frame = decode_frame(&bytes, &Limits::default()).unwrap().unwrap();
        assert_eq!(frame.packet_id(), 0x2A);
        assert_eq!(frame.body, &[1, 2]);
        assert_eq!(frame.len(), 5);
    }

    #[test]
    fn decode_rejects_length_below_header() {
        let err = decode_frame(&[0x02, 0x00, 0x01], &Limits::default()).unwrap_err();
        assert_eq!(err, DecodeError::InvalidLength { length: 2, min: 3 });
    }

    #[test]
    fn decode_rejects_length_above_limit() {
        let limits = Limits::for_testing();
        let err = decode_frame(&[0x01, 0x08, 0x01], &limits).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LimitsExceeded {
                kind: LimitKind::FrameBytes,
                limit: 1024,
                actual: 0x0801
            }
        ));
    }

    #[test]
    fn frames_keeps_trailing_partial() {
        let mut bytes = frame_bytes(1, &[0xAA]);
        bytes.extend(frame_bytes(2, &[]));
        let tail = frame_bytes(3, &[1, 2, 3]);
        bytes.extend_from_slice(&tail[..4]);

        let limits = Limits::default();
        let mut iter = frames(&bytes, &limits);
        let ids: Vec<u8> = iter.by_ref().map(|f| f.unwrap().packet_id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(iter.consumed(), 7);
        assert_eq!(iter.remainder(), &tail[..4]);
    }

    #[test]
    fn frames_stops_after_error() {
        let mut bytes = frame_bytes(1, &[]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x09, 0x03, 0x00, 0x01]);
        let limits = Limits::default();
        let mut iter = frames(&bytes, &limits);
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
        assert_eq!(iter.consumed(), 3);
    }
}
