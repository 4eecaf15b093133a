//! Protocol and direction tags.

use std::fmt;

/// Which protocol family a packet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Protocol {
    Admin = 0x01,
    Client = 0x02,
    Msu = 0x04,
    /// Server query and master-server UDP traffic.
    Query = 0x08,
    #[default]
    None = 0xFF,
}

impl Protocol {
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::Client,
        Self::Msu,
        Self::Query,
        Self::None,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
            Self::Msu => "msu",
            Self::Query => "query",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way a packet travels, seen from this side of the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Direction {
    Send = 0x01,
    Recv = 0x02,
    #[default]
    Both = 0x03,
}

impl Direction {
    /// The registry slots a schema with this direction occupies.
    #[must_use]
    pub const fn expand(self) -> &'static [Self] {
        match self {
            Self::Send => &[Self::Send],
            Self::Recv => &[Self::Recv],
            Self::Both => &[Self::Send, Self::Recv, Self::Both],
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Recv => "recv",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
