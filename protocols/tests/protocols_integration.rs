use chrono::NaiveDate;
use codec::{decode_packet, encode_frame, encode_packet, CodecLimits, ProtocolContext};
use protocols::{registry, Endpoint};
use schema::{Direction, PacketRegistry, PacketSchema, Protocol, Record, Value};

fn schema<'r>(
    registry: &'r PacketRegistry,
    protocol: Protocol,
    direction: Direction,
    id: u8,
) -> &'r PacketSchema {
    registry.resolve(protocol, direction, id).unwrap()
}

fn game_info_v1() -> Vec<u8> {
    let mut body = vec![1];
    body.extend_from_slice(b"My Server\0");
    body.extend_from_slice(b"14.1\0");
    body.extend_from_slice(&[0, 1, 8, 2, 0]);
    body.extend_from_slice(b"Random Map\0");
    body.extend_from_slice(&[0, 1, 0, 1, 1, 1]);
    body
}

#[test]
fn game_information_v1_fills_gated_defaults() {
    let registry = registry().unwrap();
    let info = schema(&registry, Protocol::Query, Direction::Recv, 1);
    let mut ctx = Endpoint::SERVER_QUERY.context();

    let record = decode_packet(info, &game_info_v1(), &mut ctx, &CodecLimits::strict()).unwrap();
    assert_eq!(ctx.version(), Some(1));
    assert_eq!(record.get("name").and_then(Value::as_str), Some("My Server"));
    assert_eq!(record.get("map_width").and_then(Value::as_u64), Some(256));
    assert_eq!(record.get("passworded").and_then(Value::as_bool), Some(true));
    assert_eq!(record.get("game_date"), Some(&Value::Date(None)));
    assert_eq!(record.get("companies_max").and_then(Value::as_u64), Some(0));
    assert_eq!(record.get("grfs").and_then(Value::as_list), Some(&[][..]));
}

#[test]
fn game_information_v4_round_trip() {
    let registry = registry().unwrap();
    let info = schema(&registry, Protocol::Query, Direction::Recv, 1);
    let grf = Record::new()
        .with("id", 0x4D47_0101u32)
        .with("md5", vec![0xAB; 16]);
    let record = info
        .default_record()
        .with("version", 4u8)
        .with("grfs", vec![grf])
        .with("game_date", NaiveDate::from_ymd_opt(1950, 3, 1).unwrap())
        .with("start_date", NaiveDate::from_ymd_opt(1950, 1, 1).unwrap())
        .with("companies_max", 15u8)
        .with("name", "Round trip")
        .with("map_name", "Map");

    let body = encode_packet(info, &record, &ProtocolContext::new()).unwrap();
    let mut ctx = ProtocolContext::new();
    let decoded = decode_packet(info, &body, &mut ctx, &CodecLimits::strict()).unwrap();
    assert_eq!(decoded, record);
    assert_eq!(ctx.version(), Some(4));
}

#[test]
fn detail_information_groups_vehicle_counts() {
    let registry = registry().unwrap();
    let detail = schema(&registry, Protocol::Query, Direction::Recv, 3);

    let mut body = vec![6, 1, 0];
    body.extend_from_slice(b"Acme\0");
    body.extend_from_slice(&1950u32.to_le_bytes());
    body.extend_from_slice(&1_000i64.to_le_bytes());
    body.extend_from_slice(&(-50i64).to_le_bytes());
    body.extend_from_slice(&0i64.to_le_bytes());
    body.extend_from_slice(&[200, 0, 0]);
    for n in [3u16, 2, 1, 0, 4, 1, 1, 1, 0, 2] {
        body.extend_from_slice(&n.to_le_bytes());
    }
    body.push(1);

    let record =
        decode_packet(detail, &body, &mut ProtocolContext::new(), &CodecLimits::strict()).unwrap();
    let companies = record.get("companies").and_then(Value::as_list).unwrap();
    assert_eq!(companies.len(), 1);
    let acme = &companies[0];
    assert_eq!(acme.get("money").and_then(Value::as_i64), Some(-50));
    let vehicles = acme.get("vehicles").and_then(Value::as_record).unwrap();
    assert_eq!(vehicles.get("train").and_then(Value::as_u64), Some(3));
    assert_eq!(vehicles.get("ship").and_then(Value::as_u64), Some(4));
    let stations = acme.get("stations").and_then(Value::as_record).unwrap();
    assert_eq!(stations.get("ship").and_then(Value::as_u64), Some(2));
    assert_eq!(acme.get("is_ai").and_then(Value::as_bool), Some(true));
}

#[test]
fn admin_protocol_settings_loop() {
    let registry = registry().unwrap();
    let protocol = schema(&registry, Protocol::Admin, Direction::Recv, 103);
    let body = [1, 1, 0, 0, 0x3F, 0, 1, 1, 0, 0x3F, 0, 0];
    let record =
        decode_packet(protocol, &body, &mut Endpoint::ADMIN.context(), &CodecLimits::strict())
            .unwrap();
    let settings = record.get("settings").and_then(Value::as_list).unwrap();
    assert_eq!(settings.len(), 2);
    assert_eq!(settings[1].get("key").and_then(Value::as_u64), Some(1));
    assert_eq!(settings[1].get("value").and_then(Value::as_u64), Some(0x3F));
}

#[test]
fn admin_gamescript_frame() {
    let registry = registry().unwrap();
    let gamescript = schema(&registry, Protocol::Admin, Direction::Send, 6);
    let record = Record::new().with("data", serde_json::json!({"action": "ping"}));
    let frame = encode_frame(gamescript, &record, &Endpoint::ADMIN.context()).unwrap();
    let payload = br#"{"action":"ping"}"#;
    assert_eq!(usize::from(u16::from_le_bytes([frame[0], frame[1]])), frame.len());
    assert_eq!(frame[2], 6);
    assert_eq!(&frame[3..frame.len() - 1], payload);
    assert_eq!(frame.last(), Some(&0));
}

#[test]
fn master_server_list() {
    let registry = registry().unwrap();
    let list = schema(&registry, Protocol::Query, Direction::Recv, 7);
    let body = [0, 2, 0, 10, 0, 0, 1, 0x8B, 0x0F, 192, 168, 1, 20, 0x8C, 0x0F];
    let record = decode_packet(
        list,
        &body,
        &mut Endpoint::MASTER_SERVER.context(),
        &CodecLimits::strict(),
    )
    .unwrap();
    let servers = record.get("servers").and_then(Value::as_list).unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(
        servers[1].get("ip"),
        Some(&Value::Ipv4("192.168.1.20".parse().unwrap()))
    );
    assert_eq!(servers[1].get("port").and_then(Value::as_u64), Some(3980));
}
