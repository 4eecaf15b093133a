//! Per-protocol socket defaults.

use codec::ProtocolContext;
use schema::{Direction, PacketRegistry, PacketTable, Protocol};

use crate::constants::{
    NETWORK_ADMIN_PORT, NETWORK_DEFAULT_PORT, NETWORK_GAME_ADMIN_VERSION,
    NETWORK_GAME_INFO_VERSION, NETWORK_MASTER_SERVER_PORT, NETWORK_MASTER_SERVER_VERSION,
};

/// How a local socket for one protocol is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub protocol: Protocol,
    /// The direction the local side receives in.
    pub direction: Direction,
    pub port: u16,
    pub version: u32,
}

impl Endpoint {
    /// Admin console client.
    pub const ADMIN: Self = Self {
        name: "admin",
        protocol: Protocol::Admin,
        direction: Direction::Recv,
        port: NETWORK_ADMIN_PORT,
        version: NETWORK_GAME_ADMIN_VERSION,
    };

    /// Server query client.
    pub const SERVER_QUERY: Self = Self {
        name: "server-query",
        protocol: Protocol::Query,
        direction: Direction::Recv,
        port: NETWORK_DEFAULT_PORT,
        version: NETWORK_GAME_INFO_VERSION,
    };

    /// Master server listing client.
    pub const MASTER_SERVER: Self = Self {
        name: "master-server",
        protocol: Protocol::Query,
        direction: Direction::Recv,
        port: NETWORK_MASTER_SERVER_PORT,
        version: NETWORK_MASTER_SERVER_VERSION,
    };

    pub const ALL: [Self; 3] = [Self::ADMIN, Self::SERVER_QUERY, Self::MASTER_SERVER];

    /// Looks an endpoint up by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name == name)
    }

    /// A fresh connection context at the default version.
    #[must_use]
    pub const fn context(&self) -> ProtocolContext {
        ProtocolContext::with_version(self.version)
    }

    /// The packets this endpoint decodes.
    #[must_use]
    pub fn recv_table(&self, registry: &PacketRegistry) -> PacketTable {
        registry.table(self.protocol, self.direction)
    }

    /// The packets this endpoint sends.
    #[must_use]
    pub fn send_table(&self, registry: &PacketRegistry) -> PacketTable {
        let send = match self.direction {
            Direction::Recv => Direction::Send,
            Direction::Send => Direction::Recv,
            Direction::Both => Direction::Both,
        };
        registry.table(self.protocol, send)
    }
}
