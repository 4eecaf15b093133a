//! Admin console protocol (TCP, port 3977).

use schema::{Direction, FieldDef, PacketSchema, Protocol, SchemaResult, Validator, Value};

use crate::constants::{
    NETWORK_CHAT_LENGTH, NETWORK_CLIENT_NAME_LENGTH, NETWORK_GAMESCRIPT_JSON_LENGTH,
    NETWORK_GAME_ADMIN_VERSION, NETWORK_PASSWORD_LENGTH, NETWORK_RCONCOMMAND_LENGTH,
    NETWORK_REVISION_LENGTH,
};

/// Highest `AdminUpdateType` value (gamescript).
const UPDATE_TYPE_MAX: i64 = 9;
/// `NetworkAction` values an admin may chat with: chat, company chat, client chat.
const ADMIN_CHAT_ACTIONS: [i64; 3] = [3, 4, 5];
/// `DestType` values: broadcast, team, client.
const DEST_TYPES: [i64; 3] = [0, 1, 2];

/// `AdminUpdateFrequency` is a bit set over the seven frequency flags.
fn is_update_frequency(value: &Value) -> bool {
    value.as_u64().map_or(true, |v| v < 0x80)
}

fn update_type() -> Validator {
    Validator::Range {
        min: 0,
        max: UPDATE_TYPE_MAX,
    }
}

fn base(name: &str, direction: Direction) -> SchemaResult<PacketSchema> {
    PacketSchema::builder(name)
        .protocol(Protocol::Admin)
        .direction(direction)
        .default_version(NETWORK_GAME_ADMIN_VERSION)
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

/// Packets the admin client sends to the server.
pub fn send() -> SchemaResult<Vec<PacketSchema>> {
    let base = base("AdminSend", Direction::Send)?;
    Ok(vec![
        packet(
            &base,
            "Join",
            0,
            vec![
                FieldDef::string("password")
                    .validator(Validator::MaxLength(NETWORK_PASSWORD_LENGTH)),
                FieldDef::string("name").trim(NETWORK_CLIENT_NAME_LENGTH),
                FieldDef::string("version").trim(NETWORK_REVISION_LENGTH),
            ],
        )?,
        packet(&base, "Quit", 1, Vec::new())?,
        packet(
            &base,
            "UpdateFrequency",
            2,
            vec![
                FieldDef::u16("update_type").validator(update_type()),
                FieldDef::u16("update_freq").validator(Validator::Predicate {
                    name: "update_frequency",
                    check: is_update_frequency,
                }),
            ],
        )?,
        packet(
            &base,
            "Poll",
            3,
            vec![
                FieldDef::u8("poll_type").validator(update_type()),
                FieldDef::u32("poll_extra"),
            ],
        )?,
        packet(
            &base,
            "Chat",
            4,
            vec![
                FieldDef::u8("action").validator(Validator::OneOf(ADMIN_CHAT_ACTIONS.to_vec())),
                FieldDef::u8("dest_type").validator(Validator::OneOf(DEST_TYPES.to_vec())),
                FieldDef::u32("client_id"),
                FieldDef::string("message").validator(Validator::MaxLength(NETWORK_CHAT_LENGTH)),
            ],
        )?,
        packet(
            &base,
            "Rcon",
            5,
            vec![FieldDef::string("command")
                .validator(Validator::MaxLength(NETWORK_RCONCOMMAND_LENGTH))],
        )?,
        packet(
            &base,
            "Gamescript",
            6,
            vec![FieldDef::json("data", NETWORK_GAMESCRIPT_JSON_LENGTH)],
        )?,
        packet(&base, "Ping", 7, vec![FieldDef::u32("payload")])?,
    ])
}

/// Packets the server sends to the admin client.
pub fn recv() -> SchemaResult<Vec<PacketSchema>> {
    let base = base("AdminRecv", Direction::Recv)?;
    Ok(vec![
        packet(&base, "Full", 100, Vec::new())?,
        packet(&base, "Banned", 101, Vec::new())?,
        packet(&base, "Error", 102, vec![FieldDef::u8("errorcode")])?,
        packet(
            &base,
            "Protocol",
            103,
            vec![
                FieldDef::u8("version"),
                FieldDef::looping(
                    "settings",
                    vec![
                        FieldDef::bool("is_next").continue_flag(),
                        FieldDef::u16("key"),
                        FieldDef::u16("value"),
                    ],
                ),
            ],
        )?,
        packet(
            &base,
            "Welcome",
            104,
            vec![
                FieldDef::string("name"),
                FieldDef::string("version"),
                FieldDef::bool("dedicated"),
                FieldDef::string("map_name"),
                FieldDef::u32("seed"),
                FieldDef::u8("landscape"),
                FieldDef::u32("startyear"),
                FieldDef::u16("size_x"),
                FieldDef::u16("size_y"),
            ],
        )?,
        packet(&base, "NewGame", 105, Vec::new())?,
        packet(&base, "Shutdown", 106, Vec::new())?,
        packet(&base, "Date", 107, vec![FieldDef::date("date")])?,
        packet(&base, "ClientJoin", 108, vec![FieldDef::u32("client_id")])?,
        packet(
            &base,
            "ClientInfo",
            109,
            vec![
                FieldDef::u32("client_id"),
                FieldDef::string("hostname"),
                FieldDef::string("name"),
                FieldDef::u8("language"),
                FieldDef::date("joindate"),
                FieldDef::u8("play_as"),
            ],
        )?,
        packet(
            &base,
            "ClientUpdate",
            110,
            vec![
                FieldDef::u32("client_id"),
                FieldDef::string("name"),
                FieldDef::u8("play_as"),
            ],
        )?,
        packet(&base, "ClientQuit", 111, vec![FieldDef::u32("client_id")])?,
        packet(
            &base,
            "ClientError",
            112,
            vec![FieldDef::u32("client_id"), FieldDef::u8("errorcode")],
        )?,
    ])
}
