//! Buffered packet socket over a byte stream.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use codec::{encode_frame, ProtocolContext};
use schema::{PacketSchema, PacketTable, Record};
use tracing::{debug, warn};

use crate::buffer::ReadBuffer;
use crate::config::TransportConfig;
use crate::drain::{drain_frames, DrainStats, Packet};
use crate::error::{TransportError, TransportResult};
use crate::queue::OutboundQueue;

/// A connection-oriented packet socket.
///
/// Nothing here blocks beyond the single read or write each call makes;
/// readiness is the caller's business. The outbound queue can be shared
/// with producer threads through [`outbound`](Self::outbound).
#[derive(Debug)]
pub struct PacketStream<S> {
    io: S,
    table: PacketTable,
    ctx: ProtocolContext,
    config: TransportConfig,
    read_buf: ReadBuffer,
    scratch: Vec<u8>,
    outbound: Arc<OutboundQueue>,
    connected: bool,
}

impl<S> PacketStream<S> {
    pub fn new(io: S, table: PacketTable, config: TransportConfig) -> Self {
        let outbound = Arc::new(OutboundQueue::new(config.queue_capacity));
        Self {
            io,
            table,
            ctx: ProtocolContext::new(),
            read_buf: ReadBuffer::with_capacity(config.read_chunk_size),
            scratch: vec![0; config.read_chunk_size.max(1)],
            config,
            outbound,
            connected: true,
        }
    }

    /// Starts the connection at a known protocol version.
    #[must_use]
    pub fn with_context(mut self, ctx: ProtocolContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub const fn get_ref(&self) -> &S {
        &self.io
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.io
    }

    pub fn into_inner(self) -> S {
        self.io
    }

    pub const fn context(&self) -> &ProtocolContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ProtocolContext {
        &mut self.ctx
    }

    pub const fn table(&self) -> &PacketTable {
        &self.table
    }

    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Bytes received but not yet drained.
    pub fn buffered(&self) -> usize {
        self.read_buf.len()
    }

    /// Handle to the outbound queue for other threads.
    pub fn outbound(&self) -> Arc<OutboundQueue> {
        Arc::clone(&self.outbound)
    }

    /// Marks the connection closed and drops pending output.
    pub fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            let dropped = self.outbound.clear();
            debug!(dropped, "packet stream disconnected");
        }
    }

    /// Decodes every complete buffered frame into `out`.
    ///
    /// A corrupt frame header disconnects the stream; packets decoded
    /// before it are still delivered.
    pub fn drain_frames(&mut self, out: &mut Vec<Packet>) -> TransportResult<DrainStats> {
        let mut buf = self.read_buf.take();
        let drained = drain_frames(
            &buf,
            &self.table,
            &mut self.ctx,
            &self.config.wire_limits,
            &self.config.codec_limits,
            out,
        );
        if let Some(err) = drained.error {
            warn!(protocol = %self.table.protocol(), error = %err, "corrupt frame header");
            self.disconnect();
            return Err(err.into());
        }
        self.read_buf.restore(buf.split_off(drained.consumed));
        Ok(drained.stats)
    }

    /// Queues raw frame bytes, blocking while the queue is full.
    pub fn queue_write(&self, chunk: Vec<u8>) {
        self.outbound.push(chunk);
    }

    /// Queues raw frame bytes, handing them back if the queue is full.
    pub fn try_queue_write(&self, chunk: Vec<u8>) -> Result<(), Vec<u8>> {
        self.outbound.try_push(chunk)
    }

    /// Queues raw frame bytes, waiting up to `timeout` for space.
    pub fn queue_write_timeout(&self, chunk: Vec<u8>, timeout: Duration) -> Result<(), Vec<u8>> {
        self.outbound.push_timeout(chunk, timeout)
    }

    /// Encodes a packet with this connection's version and queues it,
    /// blocking while the queue is full.
    ///
    /// Only safe when another thread flushes. A single-threaded event loop
    /// should use [`try_send_packet`](Self::try_send_packet).
    pub fn send_packet(&self, schema: &PacketSchema, record: &Record) -> TransportResult<()> {
        let frame = encode_frame(schema, record, &self.ctx)?;
        self.queue_write(frame);
        Ok(())
    }

    /// Encodes a packet and queues it without blocking.
    ///
    /// A full queue returns [`TransportError::QueueFull`] holding the
    /// encoded frame, which can be requeued with
    /// [`try_queue_write`](Self::try_queue_write) after a flush.
    pub fn try_send_packet(&self, schema: &PacketSchema, record: &Record) -> TransportResult<()> {
        let frame = encode_frame(schema, record, &self.ctx)?;
        self.try_queue_write(frame).map_err(|frame| TransportError::QueueFull { frame })
    }
}

impl<S: Read> PacketStream<S> {
    /// Performs one read into the receive buffer.
    ///
    /// Returns the number of bytes read. `Ok(0)` means either nothing was
    /// ready or the peer closed the connection; [`is_connected`](Self::is_connected)
    /// tells them apart.
    pub fn fill(&mut self) -> TransportResult<usize> {
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        match self.io.read(&mut self.scratch) {
            Ok(0) => {
                debug!(protocol = %self.table.protocol(), "peer closed connection");
                self.disconnect();
                Ok(0)
            }
            Ok(n) => {
                self.read_buf.extend(&self.scratch[..n]);
                Ok(n)
            }
            Err(err) if is_transient(&err) => Ok(0),
            Err(err) => {
                warn!(protocol = %self.table.protocol(), error = %err, "read failed");
                self.disconnect();
                Err(err.into())
            }
        }
    }

    /// Reads once and drains, like a receive loop iteration.
    pub fn recv_packets(&mut self) -> TransportResult<Vec<Packet>> {
        self.fill()?;
        let mut out = Vec::new();
        self.drain_frames(&mut out)?;
        Ok(out)
    }
}

impl<S: Write> PacketStream<S> {
    /// Writes up to the configured number of queued chunks.
    pub fn flush(&mut self) -> TransportResult<usize> {
        self.flush_up_to(self.config.max_frames_per_flush)
    }

    /// Writes up to `max_frames` queued chunks, returning how many went out
    /// completely.
    ///
    /// A blocked or short write puts the unsent bytes back at the head of
    /// the queue and ends the call. Any other failure disconnects and drops
    /// the chunk.
    pub fn flush_up_to(&mut self, max_frames: usize) -> TransportResult<usize> {
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        let mut written = 0;
        while written < max_frames {
            let Some(chunk) = self.outbound.pop() else {
                break;
            };
            match self.io.write(&chunk) {
                Ok(n) if n == chunk.len() => written += 1,
                Ok(0) => {
                    warn!(protocol = %self.table.protocol(), "write returned zero bytes");
                    self.disconnect();
                    return Err(TransportError::Disconnected);
                }
                Ok(n) => {
                    self.outbound.push_front(chunk[n..].to_vec());
                    break;
                }
                Err(err) if is_transient(&err) => {
                    self.outbound.push_front(chunk);
                    break;
                }
                Err(err) => {
                    warn!(protocol = %self.table.protocol(), error = %err, "write failed");
                    self.disconnect();
                    return Err(err.into());
                }
            }
        }
        Ok(written)
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
