//! Packet definitions for the OpenTTD admin, server-query and master-server
//! protocols.
//!
//! Each protocol module exposes `send()` and `recv()`, returning the concrete
//! schemas for one direction. [`registry`] registers all of them, and
//! [`Endpoint`] holds the port and version defaults for each kind of socket.
//!
//! # Example
//!
//! ```
//! use protocols::{registry, Endpoint};
//!
//! let registry = registry().unwrap();
//! let table = Endpoint::SERVER_QUERY.recv_table(&registry);
//! assert_eq!(table.get(1).map(|s| s.name()), Some("GameInformation"));
//! ```

pub mod admin;
pub mod constants;
mod defaults;
pub mod master;
pub mod query;

pub use defaults::Endpoint;

use schema::{PacketRegistry, SchemaResult};
use tracing::debug;

/// Builds a registry holding every admin, query and master-server packet.
pub fn registry() -> SchemaResult<PacketRegistry> {
    let mut registry = PacketRegistry::new();
    let tables = [
        admin::send()?,
        admin::recv()?,
        query::send()?,
        query::recv()?,
        master::send()?,
        master::recv()?,
    ];
    for schema in tables.into_iter().flatten() {
        registry.register(schema);
    }
    debug!(packets = registry.len(), "protocol registry ready");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use schema::{Direction, Protocol};

    use super::*;

    #[test]
    fn no_id_collisions() {
        let mut registry = PacketRegistry::new();
        for schema in [query::recv().unwrap(), master::recv().unwrap()]
            .into_iter()
            .flatten()
        {
            assert!(registry.register(schema).is_clean());
        }
    }

    #[test]
    fn query_and_master_share_a_table() {
        let registry = registry().unwrap();
        let table = registry.table(Protocol::Query, Direction::Recv);
        let names: Vec<_> = table.iter().map(|(id, s)| (id, s.name().to_owned())).collect();
        assert_eq!(
            names,
            vec![
                (1, "GameInformation".to_owned()),
                (3, "DetailInformation".to_owned()),
                (5, "RegisterAck".to_owned()),
                (7, "ServerList".to_owned()),
                (10, "NewGRF".to_owned()),
                (11, "SessionKey".to_owned()),
            ]
        );
    }

    #[test]
    fn admin_send_table() {
        let registry = registry().unwrap();
        let table = Endpoint::ADMIN.send_table(&registry);
        assert_eq!(table.len(), 8);
        assert_eq!(table.by_name("Gamescript").and_then(|s| s.id()), Some(6));
    }
}
