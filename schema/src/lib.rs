//! Declarative packet schemas for OpenTTD network protocols.
//!
//! This crate defines how packets are described:
//! - The field catalog (fixed-width integers, strings, dates, JSON, aggregates)
//! - Native values and decoded records
//! - The packet schema builder and its prepared, field-merged parsing plan
//! - Deterministic schema fingerprints
//! - The packet registry keyed by protocol, direction and packet id
//!
//! # Design Principles
//!
//! - **Explicit schemas** - Packets are built from ordered field lists, never by reflection.
//! - **Prepared once** - Plans are computed at build time and immutable afterwards.
//! - **Fail at startup** - Every configuration mistake is a [`SchemaError`] from `build`.
//! - **No byte handling** - Encoding and decoding live in the codec crate.
//!
//! # Example
//!
//! ```
//! use schema::{Direction, FieldDef, PacketRegistry, PacketSchema, Protocol};
//!
//! let ping = PacketSchema::builder("Ping")
//!     .id(7)
//!     .protocol(Protocol::Admin)
//!     .direction(Direction::Send)
//!     .field(FieldDef::u32("payload"))
//!     .build()
//!     .unwrap();
//!
//! let mut registry = PacketRegistry::new();
//! assert!(registry.register(ping).is_clean());
//! assert!(registry.resolve(Protocol::Admin, Direction::Send, 7).is_some());
//! ```

mod error;
mod field;
mod hash;
mod layout;
mod packet;
mod protocol;
mod registry;
mod validate;
mod value;

pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDef, FieldKind, IntKind, RepeatCount};
pub use hash::fingerprint;
pub use layout::{Layout, PlanStep};
pub use packet::{PacketSchema, PacketSchemaBuilder};
pub use protocol::{Direction, Protocol};
pub use registry::{PacketRegistry, PacketTable, Registration, RegistrationConflict};
pub use validate::Validator;
pub use value::{Record, Value};
