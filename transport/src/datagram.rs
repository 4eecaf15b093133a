//! Buffered packet socket over datagrams, with one buffer per peer.

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::{Duration, Instant};

use codec::{encode_frame, ProtocolContext};
use schema::{PacketSchema, PacketTable, Record};
use tracing::{debug, warn};

use crate::buffer::ReadBuffer;
use crate::config::TransportConfig;
use crate::drain::{drain_frames, DrainStats, Packet};
use crate::error::{TransportError, TransportResult};
use crate::queue::OutboundQueue;

/// The datagram operations a [`PacketDatagram`] needs.
pub trait DatagramSocket {
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize>;
}

impl DatagramSocket for UdpSocket {
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        Self::recv_from(self, buf)
    }

    fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        Self::send_to(self, buf, addr)
    }
}

#[derive(Debug)]
struct Peer {
    buffer: ReadBuffer,
    ctx: ProtocolContext,
}

/// A packet socket that reassembles frames separately for every sender.
#[derive(Debug)]
pub struct PacketDatagram<S> {
    socket: S,
    table: PacketTable,
    config: TransportConfig,
    initial_ctx: ProtocolContext,
    peers: HashMap<SocketAddr, Peer>,
    scratch: Vec<u8>,
    outbound: Arc<OutboundQueue<(SocketAddr, Vec<u8>)>>,
}

impl<S: DatagramSocket> PacketDatagram<S> {
    pub fn new(socket: S, table: PacketTable, config: TransportConfig) -> Self {
        let outbound = Arc::new(OutboundQueue::new(config.queue_capacity));
        Self {
            socket,
            table,
            initial_ctx: ProtocolContext::new(),
            peers: HashMap::new(),
            scratch: vec![0; wire::MAX_FRAME_LEN],
            config,
            outbound,
        }
    }

    /// Context given to peers seen for the first time.
    #[must_use]
    pub fn with_context(mut self, ctx: ProtocolContext) -> Self {
        self.initial_ctx = ctx;
        self
    }

    pub const fn get_ref(&self) -> &S {
        &self.socket
    }

    pub const fn table(&self) -> &PacketTable {
        &self.table
    }

    /// Peers with a live buffer.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Protocol context of a known peer.
    pub fn peer_context(&self, addr: SocketAddr) -> Option<&ProtocolContext> {
        self.peers.get(&addr).map(|p| &p.ctx)
    }

    /// Bytes buffered for a peer.
    pub fn buffered(&self, addr: SocketAddr) -> usize {
        self.peers.get(&addr).map_or(0, |p| p.buffer.len())
    }

    pub fn outbound(&self) -> Arc<OutboundQueue<(SocketAddr, Vec<u8>)>> {
        Arc::clone(&self.outbound)
    }

    /// Receives one datagram into its sender's buffer.
    ///
    /// Returns `Ok(None)` when nothing was ready.
    pub fn fill(&mut self) -> TransportResult<Option<(SocketAddr, usize)>> {
        match self.socket.recv_from(&mut self.scratch) {
            Ok((n, addr)) => {
                let initial_ctx = self.initial_ctx;
                let peer = self.peers.entry(addr).or_insert_with(|| {
                    debug!(peer = %addr, "new datagram peer");
                    Peer {
                        buffer: ReadBuffer::new(),
                        ctx: initial_ctx,
                    }
                });
                peer.buffer.extend(&self.scratch[..n]);
                Ok(Some((addr, n)))
            }
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Decodes every complete frame of every peer, then evicts idle peers.
    ///
    /// A corrupt header only clears that peer's buffer. Eviction runs after
    /// decoding, so a complete frame is delivered even if its sender has
    /// since gone idle; only a partial frame is lost with the peer.
    pub fn drain_frames(&mut self, out: &mut Vec<(SocketAddr, Packet)>) -> DrainStats {
        let mut stats = DrainStats::default();
        let mut packets = Vec::new();
        for (addr, peer) in &mut self.peers {
            if peer.buffer.is_empty() {
                continue;
            }
            let mut buf = peer.buffer.take();
            let drained = drain_frames(
                &buf,
                &self.table,
                &mut peer.ctx,
                &self.config.wire_limits,
                &self.config.codec_limits,
                &mut packets,
            );
            stats.merge(drained.stats);
            out.extend(packets.drain(..).map(|p| (*addr, p)));
            if let Some(err) = drained.error {
                warn!(peer = %addr, error = %err, "corrupt frame header, clearing peer buffer");
                peer.buffer.clear();
                continue;
            }
            peer.buffer.restore(buf.split_off(drained.consumed));
        }
        self.evict_idle(Instant::now());
        stats
    }

    /// Drops peers with no traffic for longer than the idle timeout.
    pub fn evict_idle(&mut self, now: Instant) -> usize {
        let timeout = self.config.peer_idle_timeout;
        let before = self.peers.len();
        self.peers.retain(|addr, peer| {
            let idle = now.saturating_duration_since(peer.buffer.last_activity());
            let keep = idle <= timeout;
            if !keep {
                debug!(peer = %addr, idle_ms = idle.as_millis(), "evicting idle peer");
            }
            keep
        });
        before - self.peers.len()
    }

    /// Queues a datagram, blocking while the queue is full.
    pub fn queue_write(&self, addr: SocketAddr, chunk: Vec<u8>) {
        self.outbound.push((addr, chunk));
    }

    /// Queues a datagram, handing it back if the queue is full.
    pub fn try_queue_write(
        &self,
        addr: SocketAddr,
        chunk: Vec<u8>,
    ) -> Result<(), (SocketAddr, Vec<u8>)> {
        self.outbound.try_push((addr, chunk))
    }

    /// Queues a datagram, waiting up to `timeout` for space.
    pub fn queue_write_timeout(
        &self,
        addr: SocketAddr,
        chunk: Vec<u8>,
        timeout: Duration,
    ) -> Result<(), (SocketAddr, Vec<u8>)> {
        self.outbound.push_timeout((addr, chunk), timeout)
    }

    /// Encodes a packet with the peer's version and queues it, blocking
    /// while the queue is full.
    pub fn send_packet(
        &self,
        addr: SocketAddr,
        schema: &PacketSchema,
        record: &Record,
    ) -> TransportResult<()> {
        let frame = self.encode_for(addr, schema, record)?;
        self.queue_write(addr, frame);
        Ok(())
    }

    /// Encodes a packet with the peer's version and queues it without
    /// blocking; a full queue returns [`TransportError::QueueFull`].
    pub fn try_send_packet(
        &self,
        addr: SocketAddr,
        schema: &PacketSchema,
        record: &Record,
    ) -> TransportResult<()> {
        let frame = self.encode_for(addr, schema, record)?;
        self.try_queue_write(addr, frame).map_err(|(_, frame)| TransportError::QueueFull { frame })
    }

    fn encode_for(
        &self,
        addr: SocketAddr,
        schema: &PacketSchema,
        record: &Record,
    ) -> TransportResult<Vec<u8>> {
        let ctx = self.peer_context(addr).unwrap_or(&self.initial_ctx);
        Ok(encode_frame(schema, record, ctx)?)
    }

    /// Sends up to the configured number of queued datagrams.
    pub fn flush(&mut self) -> usize {
        self.flush_up_to(self.config.max_frames_per_flush)
    }

    /// Sends up to `max_frames` queued datagrams, returning how many were
    /// sent. A blocked send stays queued; any other failure drops that
    /// datagram and moves on.
    pub fn flush_up_to(&mut self, max_frames: usize) -> usize {
        let mut sent = 0;
        let mut attempts = 0;
        while attempts < max_frames {
            let Some((addr, chunk)) = self.outbound.pop() else {
                break;
            };
            attempts += 1;
            match self.socket.send_to(&chunk, addr) {
                Ok(_) => sent += 1,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    self.outbound.push_front((addr, chunk));
                    break;
                }
                Err(err) => {
                    warn!(peer = %addr, error = %err, "datagram send failed, dropping");
                }
            }
        }
        sent
    }
}
