//! Master server protocol (UDP, port 3978).
//!
//! Shares the query protocol tag; its packet ids do not overlap the server
//! query ones.

use schema::{Direction, FieldDef, IntKind, PacketSchema, Protocol, RepeatCount, SchemaResult};

use crate::constants::{NETWORK_MASTER_SERVER_VERSION, NETWORK_MASTER_SERVER_WELCOME_MESSAGE};

/// `ServerListType` for IPv4 listings.
const SLT_IPV4: u8 = 0;

fn base(name: &str, direction: Direction) -> SchemaResult<PacketSchema> {
    PacketSchema::builder(name)
        .protocol(Protocol::Query)
        .direction(direction)
        .default_version(NETWORK_MASTER_SERVER_VERSION)
        .abstract_template()
        .build()
}

fn packet(
    base: &PacketSchema,
    name: &str,
    id: u8,
    fields: Vec<FieldDef>,
) -> SchemaResult<PacketSchema> {
    PacketSchema::builder(name)
        .extends(base)
        .id(id)
        .fields(fields)
        .build()
}

/// Packets a game server or listing client sends to the master server.
pub fn send() -> SchemaResult<Vec<PacketSchema>> {
    let base = base("MasterSend", Direction::Send)?;
    Ok(vec![
        packet(
            &base,
            "Register",
            4,
            vec![
                FieldDef::string("welcome_message")
                    .default_value(NETWORK_MASTER_SERVER_WELCOME_MESSAGE),
                FieldDef::u8("version").version_identifier(),
                FieldDef::u16("port"),
                FieldDef::u64("session_key").since(2),
            ],
        )?,
        packet(
            &base,
            "ServerList",
            6,
            vec![
                FieldDef::u8("version").version_identifier(),
                FieldDef::u8("ip_type").since(2).default_value(SLT_IPV4),
            ],
        )?,
        packet(
            &base,
            "Unregister",
            8,
            vec![
                FieldDef::u8("version").version_identifier(),
                FieldDef::u16("port"),
            ],
        )?,
    ])
}

/// Packets the master server answers with.
pub fn recv() -> SchemaResult<Vec<PacketSchema>> {
    let base = base("MasterRecv", Direction::Recv)?;
    Ok(vec![
        packet(&base, "RegisterAck", 5, Vec::new())?,
        packet(
            &base,
            "ServerList",
            7,
            vec![
                FieldDef::u8("ip_type"),
                FieldDef::repeating(
                    "servers",
                    RepeatCount::Prefixed(IntKind::U16),
                    vec![FieldDef::ipv4("ip"), FieldDef::u16("port")],
                ),
            ],
        )?,
        packet(&base, "SessionKey", 11, vec![FieldDef::u64("session_key")])?,
    ])
}

#[cfg(test)]
mod tests {
    use codec::{encode_packet, ProtocolContext};
    use schema::Record;

    use super::*;

    #[test]
    fn tables_build() {
        assert_eq!(send().unwrap().len(), 3);
        assert_eq!(recv().unwrap().len(), 3);
    }

    #[test]
    fn register_defaults_welcome_message() {
        let send = send().unwrap();
        let register = send.iter().find(|s| s.name() == "Register").unwrap();
        let record = Record::new()
            .with("version", 1u8)
            .with("port", 3979u16);
        let body = encode_packet(register, &record, &ProtocolContext::new()).unwrap();
        let mut expected = b"OpenTTDRegister\0".to_vec();
        expected.extend_from_slice(&[1, 0x8B, 0x0F]);
        assert_eq!(body, expected);
    }
}
