use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use codec::{encode_frame, ProtocolContext};
use proptest::prelude::*;
use schema::{Direction, FieldDef, PacketRegistry, PacketSchema, Protocol, Record};
use transport::{PacketDatagram, PacketStream, TransportConfig};

/// Reads hand out at most `chunk` bytes at a time.
struct Trickle {
    data: VecDeque<u8>,
    chunk: usize,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let n = self.chunk.min(buf.len()).min(self.data.len());
        for (slot, byte) in buf.iter_mut().zip(self.data.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for Trickle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn registry() -> PacketRegistry {
    let mut registry = PacketRegistry::new();
    registry.register(
        PacketSchema::builder("Chat")
            .id(4)
            .protocol(Protocol::Admin)
            .direction(Direction::Recv)
            .field(FieldDef::u8("action"))
            .field(FieldDef::u32("client_id"))
            .field(FieldDef::string("message"))
            .build()
            .unwrap(),
    );
    registry.register(
        PacketSchema::builder("Info")
            .id(1)
            .protocol(Protocol::Admin)
            .direction(Direction::Recv)
            .default_version(1)
            .field(FieldDef::u8("version").version_identifier())
            .field(FieldDef::u16("extra").since(2))
            .build()
            .unwrap(),
    );
    registry
}

fn chat(action: u8, client_id: u32, message: &str) -> Vec<u8> {
    let registry = registry();
    let schema = registry
        .resolve(Protocol::Admin, Direction::Recv, 4)
        .unwrap();
    let record = Record::new()
        .with("action", action)
        .with("client_id", client_id)
        .with("message", message);
    encode_frame(schema, &record, &ProtocolContext::new()).unwrap()
}

fn receive_all(bytes: &[u8], chunk: usize) -> Vec<Record> {
    let table = registry().table(Protocol::Admin, Direction::Recv);
    let io = Trickle {
        data: bytes.iter().copied().collect(),
        chunk,
    };
    let mut stream = PacketStream::new(io, table, TransportConfig::default());
    let mut packets = Vec::new();
    while !stream.get_ref().data.is_empty() {
        stream.fill().unwrap();
        stream.drain_frames(&mut packets).unwrap();
    }
    packets.into_iter().map(|p| p.record).collect()
}

#[test]
fn unknown_id_skipped_and_stream_continues() {
    let mut bytes = chat(1, 2, "first");
    bytes.extend_from_slice(&[6, 0, 200, 1, 2, 3]);
    bytes.extend(chat(3, 4, "second"));

    let records = receive_all(&bytes, bytes.len());
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("message").and_then(|v| v.as_str()), Some("second"));
}

#[test]
fn undecodable_frame_discarded() {
    let mut bytes = vec![5, 0, 4, 1, 2];
    bytes.extend(chat(1, 2, "after"));
    let records = receive_all(&bytes, 3);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("client_id").and_then(|v| v.as_u64()), Some(2));
}

#[test]
fn version_persists_across_frames() {
    let table = registry().table(Protocol::Admin, Direction::Recv);
    let io = Trickle {
        data: [5u8, 0, 1, 2, 0].into_iter().chain([6, 0, 1, 2, 9, 0]).collect(),
        chunk: 64,
    };
    let mut stream = PacketStream::new(io, table, TransportConfig::default());
    stream.fill().unwrap();
    let mut packets = Vec::new();
    let stats = stream.drain_frames(&mut packets).unwrap();
    // The first frame announces version 2 but is missing `extra`.
    assert_eq!(stats.discarded, 1);
    assert_eq!(stats.decoded, 1);
    assert_eq!(stream.context().version(), Some(2));
    assert_eq!(packets[0].record.get("extra").and_then(|v| v.as_u64()), Some(9));
}

#[test]
fn datagram_over_udp_loopback() {
    let server = UdpSocket::bind("127.0.0.1:0").unwrap();
    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    let server_addr: SocketAddr = server.local_addr().unwrap();
    let table = registry().table(Protocol::Admin, Direction::Recv);
    let mut datagram = PacketDatagram::new(server, table, TransportConfig::default());

    client.send_to(&chat(1, 7, "hello"), server_addr).unwrap();
    let (from, _) = datagram.fill().unwrap().unwrap();
    assert_eq!(from, client.local_addr().unwrap());

    let mut packets = Vec::new();
    datagram.drain_frames(&mut packets);
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].1.name(), "Chat");
}

fn frames_strategy() -> impl Strategy<Value = Vec<(u8, u32, String)>> {
    prop::collection::vec((any::<u8>(), any::<u32>(), "[a-z ]{0,40}"), 1..8)
}

proptest! {
    #[test]
    fn byte_by_byte_matches_all_at_once(frames in frames_strategy(), chunk in 1usize..16) {
        let mut bytes = Vec::new();
        for (action, client_id, message) in &frames {
            bytes.extend(chat(*action, *client_id, message));
        }
        let whole = receive_all(&bytes, bytes.len());
        let single = receive_all(&bytes, 1);
        let chunked = receive_all(&bytes, chunk);
        prop_assert_eq!(whole.len(), frames.len());
        prop_assert_eq!(&single, &whole);
        prop_assert_eq!(&chunked, &whole);
    }
}

#[test]
fn shared_queue_from_producer_thread() {
    let table = registry().table(Protocol::Admin, Direction::Recv);
    let io = Trickle {
        data: VecDeque::new(),
        chunk: 1,
    };
    let mut stream = PacketStream::new(io, table, TransportConfig::for_testing());
    let queue = stream.outbound();
    let producer = std::thread::spawn({
        let queue = Arc::clone(&queue);
        move || {
            for i in 0..20u8 {
                queue.push(vec![i]);
            }
        }
    });
    let mut written = 0;
    while written < 20 {
        written += stream.flush().unwrap();
    }
    producer.join().unwrap();
    assert!(queue.is_empty());
}
