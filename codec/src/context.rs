//! Per-connection protocol version state.

use schema::{FieldDef, PacketSchema};

/// Negotiated protocol version for one connection.
///
/// Until a version is set or read from a version identifier field, each
/// packet falls back to its schema's default version, then to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolContext {
    version: Option<u32>,
}

impl ProtocolContext {
    #[must_use]
    pub const fn new() -> Self {
        Self { version: None }
    }

    #[must_use]
    pub const fn with_version(version: u32) -> Self {
        Self {
            version: Some(version),
        }
    }

    #[must_use]
    pub const fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = Some(version);
    }

    /// Starts the version cursor for one packet.
    #[must_use]
    pub fn cursor(&self, schema: &PacketSchema) -> VersionCursor {
        VersionCursor::new(self.version.or(schema.default_version()).unwrap_or(0))
    }

    /// Adopts the version a finished decode read from the wire, if any.
    pub fn commit(&mut self, cursor: &VersionCursor) {
        if let Some(version) = cursor.identified() {
            self.version = Some(version);
        }
    }
}

/// The working version during a single encode or decode pass.
///
/// Starts at the connection's version and moves as soon as the version
/// identifier field is read or written, so later fields of the same packet
/// are gated on the new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCursor {
    current: u32,
    identified: Option<u32>,
}

impl VersionCursor {
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self {
            current: version,
            identified: None,
        }
    }

    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// The version taken from a version identifier field in this pass.
    #[must_use]
    pub const fn identified(&self) -> Option<u32> {
        self.identified
    }

    /// Records a version identifier value.
    pub fn identify(&mut self, version: u32) {
        self.current = version;
        self.identified = Some(version);
    }

    /// Whether `field` is on the wire at the working version.
    #[must_use]
    pub fn allows(&self, field: &FieldDef) -> bool {
        field.present_at(self.current)
    }
}
