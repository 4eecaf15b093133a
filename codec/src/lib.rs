//! Packet encoding and decoding for OpenTTD network protocols.
//!
//! This crate ties together bytestream, wire, and schema: it turns packet
//! bodies into [`Record`](schema::Record)s and back by walking each schema's
//! prepared plan.
//!
//! # Features
//!
//! - Merged reads and writes for runs of fixed-width fields
//! - Per-connection protocol versions with in-packet version switching
//! - Repeating, grouped and looping aggregates
//! - Encode-time validation before any byte is written for a group
//!
//! # Design Principles
//!
//! - **Schema driven** - No packet-specific code; every packet is a schema.
//! - **Bounded** - Sequence lengths are limited by [`CodecLimits`].
//! - **Context explicit** - Version state lives in a caller-owned [`ProtocolContext`].
//!
//! # Example
//!
//! ```
//! use codec::{decode_packet, encode_packet, CodecLimits, ProtocolContext};
//! use schema::{FieldDef, PacketSchema, Record};
//!
//! let ping = PacketSchema::builder("Ping")
//!     .id(7)
//!     .field(FieldDef::u32("payload"))
//!     .build()
//!     .unwrap();
//!
//! let mut ctx = ProtocolContext::new();
//! let record = Record::new().with("payload", 42u32);
//! let body = encode_packet(&ping, &record, &ctx).unwrap();
//! assert_eq!(body, vec![42, 0, 0, 0]);
//!
//! let decoded = decode_packet(&ping, &body, &mut ctx, &CodecLimits::default()).unwrap();
//! assert_eq!(decoded, record);
//! ```

mod context;
mod error;
mod limits;
mod packet;
mod value;

pub use context::{ProtocolContext, VersionCursor};
pub use error::{CodecError, CodecResult, LimitKind, ValueReason};
pub use limits::CodecLimits;
pub use packet::{decode_packet, encode_frame, encode_packet};
pub use value::DATE_EPOCH_DAYS;
pub use wire::Limits as WireLimits;
