//! Length-prefixed framing for OpenTTD network protocols.
//!
//! Every packet on the admin, server-query and master-server sockets travels
//! in a frame: a little-endian `u16` total length (header included), a `u8`
//! packet id, then the body. This crate splits byte streams into frames and
//! builds frames from encoded bodies. It knows nothing about packet bodies.
//!
//! # Design Principles
//!
//! - **Partial frames are normal** - An incomplete frame yields `None`, never an error.
//! - **Bounded decoding** - Lengths are validated against limits before any body is sliced.
//! - **No domain knowledge** - This crate handles framing, not packet layouts.

mod error;
mod frame;
mod header;
mod limits;

pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use frame::{
    decode_frame, encode_frame, frame_header, frames, peek_header, Frame, Frames,
};
pub use header::{FrameHeader, HEADER_SIZE, MAX_FRAME_LEN};
pub use limits::Limits;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = HEADER_SIZE;
        let _ = MAX_FRAME_LEN;
        let _ = FrameHeader::new(3, 0);
        let _ = Limits::default();
        let _ = LimitKind::FrameBytes;
        let _: WireResult<()> = Ok(());
    }

    #[test]
    fn encode_then_split() {
        let mut buf = Vec::new();
        encode_frame(7, b"abc", &mut buf).unwrap();
        encode_frame(8, b"", &mut buf).unwrap();

        let limits = Limits::default();
        let decoded: Vec<(u8, Vec<u8>)> = frames(&buf, &limits)
            .map(|f| f.map(|f| (f.packet_id(), f.body.to_vec())))
            .collect::<WireResult<_>>()
            .unwrap();
        assert_eq!(decoded, vec![(7, b"abc".to_vec()), (8, Vec::new())]);
    }
}
