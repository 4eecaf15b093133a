//! Buffered packet sockets for OpenTTD network protocols.
//!
//! This crate sits on top of wire, schema and codec:
//! - [`PacketStream`] frames a byte stream, decodes frames against a
//!   [`PacketTable`](schema::PacketTable) and queues outbound frames
//! - [`PacketDatagram`] does the same per sender address, evicting idle peers
//! - [`drain_frames`] is the shared frame-splitting and dispatch step
//!
//! # Design Principles
//!
//! - **Caller-driven** - No event loop here; callers decide when to `fill`,
//!   `drain_frames` and `flush`.
//! - **Partial frames are normal** - Incomplete bytes wait for the next fill.
//! - **Skip, don't stall** - Unknown ids and bad bodies drop one frame only.
//! - **Bounded output** - Producers block on a full [`OutboundQueue`].

mod buffer;
mod config;
mod datagram;
mod drain;
mod error;
mod queue;
mod stream;

pub use buffer::ReadBuffer;
pub use config::TransportConfig;
pub use datagram::{DatagramSocket, PacketDatagram};
pub use drain::{drain_frames, DrainStats, Drained, Packet};
pub use error::{TransportError, TransportResult};
pub use queue::OutboundQueue;
pub use stream::PacketStream;
