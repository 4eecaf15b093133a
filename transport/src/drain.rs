//! Splitting buffered bytes into decoded packets.

use std::sync::Arc;

use codec::{decode_packet, CodecLimits, ProtocolContext};
use schema::{PacketSchema, PacketTable, Record};
use tracing::{debug, trace};
use wire::Limits;

/// A decoded packet and the schema it was decoded with.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub schema: Arc<PacketSchema>,
    pub record: Record,
}

impl Packet {
    #[must_use]
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// The packet id, taken from the schema that matched the frame.
    #[must_use]
    pub fn packet_id(&self) -> u8 {
        self.schema.id().unwrap_or_default()
    }
}

/// Per-drain frame counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Frames decoded into packets.
    pub decoded: usize,
    /// Frames skipped because no schema matched their id.
    pub unknown: usize,
    /// Frames whose body failed to decode.
    pub discarded: usize,
}

impl DrainStats {
    /// Complete frames seen.
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.decoded + self.unknown + self.discarded
    }

    pub fn merge(&mut self, other: Self) {
        self.decoded += other.decoded;
        self.unknown += other.unknown;
        self.discarded += other.discarded;
    }
}

/// Result of draining one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drained {
    /// Bytes covered by complete frames. The rest must be kept.
    pub consumed: usize,
    pub stats: DrainStats,
    /// A corrupt header that stopped the drain.
    pub error: Option<wire::DecodeError>,
}

/// Decodes every complete frame at the front of `buf`.
///
/// Unknown ids and undecodable bodies skip their frame only. Decoded
/// packets are appended to `out` in stream order.
pub fn drain_frames(
    buf: &[u8],
    table: &PacketTable,
    ctx: &mut ProtocolContext,
    wire_limits: &Limits,
    codec_limits: &CodecLimits,
    out: &mut Vec<Packet>,
) -> Drained {
    let mut stats = DrainStats::default();
    let mut error = None;
    let mut frames = wire::frames(buf, wire_limits);

    for frame in frames.by_ref() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                error = Some(err);
                break;
            }
        };
        let packet_id = frame.packet_id();
        let Some(schema) = table.get(packet_id) else {
            trace!(
                packet_id,
                protocol = %table.protocol(),
                len = frame.len(),
                "skipping unknown packet"
            );
            stats.unknown += 1;
            continue;
        };
        match decode_packet(schema, frame.body, ctx, codec_limits) {
            Ok(record) => {
                stats.decoded += 1;
                out.push(Packet {
                    schema: Arc::clone(schema),
                    record,
                });
            }
            Err(err) => {
                debug!(
                    packet_id,
                    packet = schema.name(),
                    error = %err,
                    "discarding undecodable packet"
                );
                stats.discarded += 1;
            }
        }
    }

    Drained {
        consumed: frames.consumed(),
        stats,
        error,
    }
}

#[cfg(test)]
mod tests {
    use schema::{Direction, FieldDef, Protocol};

    use super::*;

    fn table() -> PacketTable {
        let ping = PacketSchema::builder("Ping")
            .id(7)
            .field(FieldDef::u32("payload"))
            .build()
            .unwrap();
        PacketTable::from_schemas(Protocol::Admin, Direction::Recv, [Arc::new(ping)])
    }

    fn drain(buf: &[u8]) -> (Drained, Vec<Packet>) {
        let mut out = Vec::new();
        let drained = drain_frames(
            buf,
            &table(),
            &mut ProtocolContext::new(),
            &Limits::default(),
            &CodecLimits::strict(),
            &mut out,
        );
        (drained, out)
    }

    #[test]
    fn decodes_complete_frames() {
        let buf = [7, 0, 7, 1, 0, 0, 0, 7, 0, 7, 2, 0, 0, 0];
        let (drained, out) = drain(&buf);
        assert_eq!(drained.consumed, 14);
        assert_eq!(drained.stats.decoded, 2);
        assert_eq!(out[1].record.get("payload").and_then(|v| v.as_u64()), Some(2));
        assert_eq!(out[0].name(), "Ping");
        assert_eq!(out[0].packet_id(), 7);
    }

    #[test]
    fn keeps_partial_tail() {
        let buf = [7, 0, 7, 1, 0, 0, 0, 7, 0, 7, 2];
        let (drained, out) = drain(&buf);
        assert_eq!(drained.consumed, 7);
        assert_eq!(out.len(), 1);
        assert!(drained.error.is_none());
    }

    #[test]
    fn skips_unknown_and_bad_bodies() {
        let buf = [4, 0, 9, 0xAA, 5, 0, 7, 1, 0, 7, 0, 7, 3, 0, 0, 0];
        let (drained, out) = drain(&buf);
        assert_eq!(
            drained.stats,
            DrainStats {
                decoded: 1,
                unknown: 1,
                discarded: 1
            }
        );
        assert_eq!(drained.stats.frames(), 3);
        assert_eq!(drained.consumed, buf.len());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn stops_at_corrupt_header() {
        let buf = [7, 0, 7, 1, 0, 0, 0, 1, 0, 7];
        let (drained, out) = drain(&buf);
        assert_eq!(out.len(), 1);
        assert_eq!(drained.consumed, 7);
        assert_eq!(
            drained.error,
            Some(wire::DecodeError::InvalidLength { length: 1, min: 3 })
        );
    }

    #[test]
    fn stats_merge() {
        let mut total = DrainStats::default();
        total.merge(DrainStats {
            decoded: 2,
            unknown: 1,
            discarded: 0,
        });
        total.merge(DrainStats {
            decoded: 1,
            unknown: 0,
            discarded: 3,
        });
        assert_eq!(total.frames(), 7);
    }
}
