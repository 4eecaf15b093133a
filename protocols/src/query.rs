//! Server query protocol (UDP, port 3979).
//!
//! `GameInformation` carries its own game-info version; fields added in
//! later versions are gated on it.

use schema::{Direction, FieldDef, IntKind, PacketSchema, Protocol, RepeatCount, SchemaResult};

use crate::constants::{
    MD5_LENGTH, NETWORK_GAME_INFO_VERSION, NETWORK_NAME_LENGTH, NETWORK_REVISION_LENGTH,
};

const VEHICLE_KINDS: [&str; 5] = ["train", "lorry", "bus", "plane", "ship"];

fn base(name: &str, direction: Direction) -> SchemaResult<PacketSchema> {
    PacketSchema::builder(name)
        .protocol(Protocol::Query)
        .direction(direction)
        .default_version(NETWORK_GAME_INFO_VERSION)
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

/// NewGRF identity: GRF id and MD5 checksum.
fn grf_identity() -> Vec<FieldDef> {
    vec![FieldDef::u32("id"), FieldDef::bytes("md5", MD5_LENGTH)]
}

/// One counter per vehicle kind.
fn per_vehicle_kind(name: &str) -> FieldDef {
    FieldDef::grouped(name, VEHICLE_KINDS.iter().map(|k| FieldDef::u16(*k)).collect())
        .expect_count(VEHICLE_KINDS.len())
}

/// Packets a client sends to a game server.
pub fn send() -> SchemaResult<Vec<PacketSchema>> {
    let base = base("QuerySend", Direction::Send)?;
    Ok(vec![
        packet(&base, "FindServer", 0, Vec::new())?,
        packet(&base, "DetailInformation", 2, Vec::new())?,
        packet(
            &base,
            "GetNewGRFList",
            9,
            vec![FieldDef::repeating(
                "newgrfs",
                RepeatCount::Prefixed(IntKind::U8),
                grf_identity(),
            )],
        )?,
    ])
}

/// Packets a game server answers with.
pub fn recv() -> SchemaResult<Vec<PacketSchema>> {
    let base = base("QueryRecv", Direction::Recv)?;
    Ok(vec![
        packet(
            &base,
            "GameInformation",
            1,
            vec![
                FieldDef::u8("version").version_identifier(),
                FieldDef::repeating("grfs", RepeatCount::Prefixed(IntKind::U8), grf_identity())
                    .since(4),
                FieldDef::date("game_date").since(3),
                FieldDef::date("start_date").since(3),
                FieldDef::u8("companies_max").since(2),
                FieldDef::u8("companies_on").since(2),
                FieldDef::u8("spectators_max").since(2),
                FieldDef::string("name").trim(NETWORK_NAME_LENGTH),
                FieldDef::string("revision").trim(NETWORK_REVISION_LENGTH),
                FieldDef::u8("language"),
                FieldDef::bool("passworded"),
                FieldDef::u8("clients_max"),
                FieldDef::u8("clients_on"),
                FieldDef::u8("spectators_on"),
                FieldDef::string("map_name"),
                FieldDef::u16("map_width"),
                FieldDef::u16("map_height"),
                FieldDef::u8("map_set"),
                FieldDef::u8("dedicated"),
            ],
        )?,
        packet(
            &base,
            "DetailInformation",
            3,
            vec![
                FieldDef::u8("company_info_version"),
                FieldDef::repeating(
                    "companies",
                    RepeatCount::Prefixed(IntKind::U8),
                    vec![
                        FieldDef::u8("index"),
                        FieldDef::string("name"),
                        FieldDef::u32("inaugurated_year"),
                        FieldDef::i64("value"),
                        FieldDef::i64("money"),
                        FieldDef::i64("income"),
                        FieldDef::u16("performance"),
                        FieldDef::bool("passworded"),
                        per_vehicle_kind("vehicles"),
                        per_vehicle_kind("stations"),
                        FieldDef::bool("is_ai"),
                    ],
                ),
            ],
        )?,
        packet(
            &base,
            "NewGRF",
            10,
            vec![FieldDef::repeating(
                "newgrfs",
                RepeatCount::Prefixed(IntKind::U8),
                grf_identity()
                    .into_iter()
                    .chain([FieldDef::string("name")])
                    .collect(),
            )],
        )?,
    ])
}
