//! Capture inspection and decoding for OpenTTD network protocols.
//!
//! A capture is the raw byte stream of one socket direction, either binary
//! or hex text. Captures go through the same frame drain the transport uses,
//! so what the tools print is what a live connection would have decoded.
//!
//! # Design Principles
//!
//! - **Same path as production** - Decoding reuses [`transport::drain_frames`].
//! - **Human-readable output** - JSON for scripts, a pretty form for people.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use codec::{CodecLimits, ProtocolContext};
use schema::{PacketTable, Record, Value};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use transport::DrainStats;
use wire::Limits;

/// Turns capture file contents into raw bytes.
///
/// Hex captures may contain whitespace and `#` comment lines.
pub fn parse_capture(raw: &[u8], hex_text: bool) -> Result<Vec<u8>> {
    if !hex_text {
        return Ok(raw.to_vec());
    }
    let text = std::str::from_utf8(raw).context("hex capture is not utf-8")?;
    let digits: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect();
    hex::decode(&digits).context("invalid hex capture")
}

/// One decoded packet.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedPacket {
    pub packet_id: u8,
    pub name: String,
    pub fields: Json,
}

/// Everything decoded from one capture.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeOutput {
    pub protocol: String,
    pub direction: String,
    /// Connection version after the last packet.
    pub version: Option<u32>,
    pub packets: Vec<DecodedPacket>,
    pub decoded: usize,
    pub unknown: usize,
    pub discarded: usize,
    /// Bytes after the last complete frame.
    pub trailing_bytes: usize,
    /// Header corruption that stopped decoding.
    pub error: Option<String>,
}

/// Decodes every complete frame in `bytes`.
pub fn decode_capture(
    bytes: &[u8],
    table: &PacketTable,
    ctx: &mut ProtocolContext,
    wire_limits: &Limits,
    codec_limits: &CodecLimits,
) -> DecodeOutput {
    let mut packets = Vec::new();
    let drained =
        transport::drain_frames(bytes, table, ctx, wire_limits, codec_limits, &mut packets);
    let DrainStats {
        decoded,
        unknown,
        discarded,
    } = drained.stats;
    DecodeOutput {
        protocol: table.protocol().to_string(),
        direction: table.direction().to_string(),
        version: ctx.version(),
        packets: packets
            .iter()
            .map(|p| DecodedPacket {
                packet_id: p.packet_id(),
                name: p.name().to_owned(),
                fields: record_to_json(&p.record),
            })
            .collect(),
        decoded,
        unknown,
        discarded,
        trailing_bytes: bytes.len() - drained.consumed,
        error: drained.error.map(|e| e.to_string()),
    }
}

/// Renders a record as a JSON object.
///
/// Byte arrays become hex strings, dates ISO strings (null for "no date")
/// and addresses dotted quads.
pub fn record_to_json(record: &Record) -> Json {
    let fields: Map<String, Json> = record
        .iter()
        .map(|(name, value)| (name.to_owned(), value_to_json(value)))
        .collect();
    Json::Object(fields)
}

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(v) => Json::Bool(*v),
        Value::UInt(v) => Json::from(*v),
        Value::Int(v) => Json::from(*v),
        Value::Bytes(v) => Json::String(hex::encode(v)),
        Value::Str(v) => Json::String(v.clone()),
        Value::Ipv4(v) => Json::String(v.to_string()),
        Value::Date(v) => v.map_or(Json::Null, |d| Json::String(d.to_string())),
        Value::Json(v) => v.clone(),
        Value::List(items) => Json::Array(items.iter().map(record_to_json).collect()),
        Value::Record(record) => record_to_json(record),
    }
}

pub fn format_decode_pretty(output: &DecodeOutput) -> String {
    let mut lines = Vec::new();
    let version = output
        .version
        .map_or_else(|| "default".to_string(), |v| v.to_string());
    lines.push(format!(
        "{} {} (version {version})",
        output.protocol, output.direction
    ));
    for packet in &output.packets {
        lines.push(format!("[{}] {}", packet.packet_id, packet.name));
        if let Json::Object(fields) = &packet.fields {
            for (name, value) in fields {
                lines.push(format!("  {name}: {value}"));
            }
        }
    }
    lines.push(format!(
        "decoded: {} unknown: {} discarded: {} trailing: {} bytes",
        output.decoded, output.unknown, output.discarded, output.trailing_bytes
    ));
    if let Some(error) = &output.error {
        lines.push(format!("stopped: {error}"));
    }
    lines.join("\n")
}

/// Frame counts for one packet id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketSummary {
    pub packet_id: u8,
    /// `None` when the table has no schema for the id.
    pub name: Option<String>,
    pub count: usize,
    pub bytes: usize,
}

/// Frame statistics for one capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub frames: usize,
    pub frame_bytes: usize,
    pub trailing_bytes: usize,
    pub packets: Vec<PacketSummary>,
    pub error: Option<String>,
}

/// Counts frames by packet id without decoding bodies.
pub fn inspect_capture(bytes: &[u8], table: &PacketTable, wire_limits: &Limits) -> InspectReport {
    let mut by_id: BTreeMap<u8, PacketSummary> = BTreeMap::new();
    let mut error = None;
    let mut frames = wire::frames(bytes, wire_limits);
    for frame in frames.by_ref() {
        match frame {
            Ok(frame) => {
                let id = frame.packet_id();
                let entry = by_id.entry(id).or_insert_with(|| PacketSummary {
                    packet_id: id,
                    name: table.get(id).map(|s| s.name().to_owned()),
                    count: 0,
                    bytes: 0,
                });
                entry.count += 1;
                entry.bytes += frame.len();
            }
            Err(err) => {
                error = Some(err.to_string());
                break;
            }
        }
    }
    let packets: Vec<PacketSummary> = by_id.into_values().collect();
    InspectReport {
        frames: packets.iter().map(|p| p.count).sum(),
        frame_bytes: frames.consumed(),
        trailing_bytes: bytes.len() - frames.consumed(),
        packets,
        error,
    }
}
