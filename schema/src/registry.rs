//! Packet registry keyed by (protocol, direction, packet id).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::packet::PacketSchema;
use crate::protocol::{Direction, Protocol};

type Table = BTreeMap<u8, Arc<PacketSchema>>;

/// A registration that lost to an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConflict {
    pub protocol: Protocol,
    pub direction: Direction,
    pub packet_id: u8,
    /// Name of the schema already registered.
    pub existing: String,
    /// Name of the schema that was not registered.
    pub rejected: String,
}

impl fmt::Display for RegistrationConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "packet {} collides with {} for id {} ({} {}) and was not registered",
            self.rejected, self.existing, self.packet_id, self.protocol, self.direction
        )
    }
}

/// Outcome of [`PacketRegistry::register`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Directions the schema now occupies (identical re-registrations included).
    pub registered: Vec<Direction>,
    pub conflicts: Vec<RegistrationConflict>,
}

impl Registration {
    /// `true` if no slot was lost to a conflict.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Lookup table from (protocol, direction, id) to schema.
#[derive(Debug, Clone, Default)]
pub struct PacketRegistry {
    tables: HashMap<(Protocol, Direction), Table>,
}

impl PacketRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under every slot its direction expands to.
    ///
    /// Abstract schemas are ignored. A slot already holding a different
    /// schema is kept unless the incoming one is marked as an override; the
    /// loss is reported in the returned [`Registration`] and logged.
    pub fn register(&mut self, schema: impl Into<Arc<PacketSchema>>) -> Registration {
        let schema = schema.into();
        let mut outcome = Registration::default();
        let Some(id) = schema.id().filter(|_| !schema.is_abstract()) else {
            debug!(packet = schema.name(), "skipping abstract packet");
            return outcome;
        };

        for &direction in schema.direction().expand() {
            let table = self
                .tables
                .entry((schema.protocol(), direction))
                .or_default();
            let existing = table
                .get(&id)
                .map(|e| (e.fingerprint(), e.name().to_owned()));
            match existing {
                Some((fingerprint, _)) if fingerprint == schema.fingerprint() => {}
                Some((_, existing)) if !schema.overrides() => {
                    warn!(
                        packet = schema.name(),
                        existing = existing.as_str(),
                        packet_id = id,
                        protocol = %schema.protocol(),
                        direction = %direction,
                        "packet id collision, registration skipped"
                    );
                    outcome.conflicts.push(RegistrationConflict {
                        protocol: schema.protocol(),
                        direction,
                        packet_id: id,
                        existing,
                        rejected: schema.name().to_owned(),
                    });
                    continue;
                }
                _ => {
                    table.insert(id, Arc::clone(&schema));
                    debug!(
                        packet = schema.name(),
                        packet_id = id,
                        protocol = %schema.protocol(),
                        direction = %direction,
                        "registered packet"
                    );
                }
            }
            outcome.registered.push(direction);
        }
        outcome
    }

    /// Looks up the schema for an id. `None` means "skip this frame".
    #[must_use]
    pub fn resolve(
        &self,
        protocol: Protocol,
        direction: Direction,
        packet_id: u8,
    ) -> Option<&Arc<PacketSchema>> {
        self.tables.get(&(protocol, direction))?.get(&packet_id)
    }

    /// Schemas registered in one slot, by id.
    pub fn schemas(
        &self,
        protocol: Protocol,
        direction: Direction,
    ) -> impl Iterator<Item = &Arc<PacketSchema>> + '_ {
        self.tables
            .get(&(protocol, direction))
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    /// Builds the id lookup a socket uses.
    ///
    /// For [`Direction::Both`] this merges the send and receive slots, with
    /// receive entries winning on a shared id.
    #[must_use]
    pub fn table(&self, protocol: Protocol, direction: Direction) -> PacketTable {
        let directions: &[Direction] = match direction {
            Direction::Both => &[Direction::Send, Direction::Recv],
            Direction::Send => &[Direction::Send],
            Direction::Recv => &[Direction::Recv],
        };
        let mut entries = Table::new();
        for &d in directions {
            if let Some(table) = self.tables.get(&(protocol, d)) {
                entries.extend(table.iter().map(|(id, s)| (*id, Arc::clone(s))));
            }
        }
        PacketTable {
            protocol,
            direction,
            entries,
        }
    }

    /// Number of occupied (protocol, direction, id) slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A snapshot of one socket's id lookup.
#[derive(Debug, Clone, Default)]
pub struct PacketTable {
    protocol: Protocol,
    direction: Direction,
    entries: Table,
}

impl PacketTable {
    /// Builds a table directly from schemas, later entries winning.
    pub fn from_schemas(
        protocol: Protocol,
        direction: Direction,
        schemas: impl IntoIterator<Item = Arc<PacketSchema>>,
    ) -> Self {
        let entries = schemas
            .into_iter()
            .filter_map(|s| s.id().map(|id| (id, s)))
            .collect();
        Self {
            protocol,
            direction,
            entries,
        }
    }

    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn get(&self, packet_id: u8) -> Option<&Arc<PacketSchema>> {
        self.entries.get(&packet_id)
    }

    /// Finds a schema by packet name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Arc<PacketSchema>> {
        self.entries.values().find(|s| s.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Arc<PacketSchema>)> + '_ {
        self.entries.iter().map(|(id, s)| (*id, s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
