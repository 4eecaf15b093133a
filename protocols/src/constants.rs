//! Ports, protocol versions and buffer lengths used by the packet tables.

/// Admin console TCP port.
pub const NETWORK_ADMIN_PORT: u16 = 3977;
/// Master server UDP port.
pub const NETWORK_MASTER_SERVER_PORT: u16 = 3978;
/// Game server port, also answering server queries over UDP.
pub const NETWORK_DEFAULT_PORT: u16 = 3979;

pub const NETWORK_GAME_ADMIN_VERSION: u32 = 1;
pub const NETWORK_GAME_INFO_VERSION: u32 = 4;
pub const NETWORK_COMPANY_INFO_VERSION: u8 = 6;
pub const NETWORK_MASTER_SERVER_VERSION: u32 = 2;

/// Greeting that opens a master-server registration.
pub const NETWORK_MASTER_SERVER_WELCOME_MESSAGE: &str = "OpenTTDRegister";

// Buffer sizes, terminator included.
pub const NETWORK_NAME_LENGTH: usize = 80;
pub const NETWORK_REVISION_LENGTH: usize = 15;
pub const NETWORK_PASSWORD_LENGTH: usize = 33;
pub const NETWORK_CLIENT_NAME_LENGTH: usize = 25;
pub const NETWORK_CHAT_LENGTH: usize = 900;
pub const NETWORK_RCONCOMMAND_LENGTH: usize = 500;
pub const NETWORK_GAMESCRIPT_JSON_LENGTH: usize = 1457;

/// Bytes in a NewGRF MD5 checksum.
pub const MD5_LENGTH: usize = 16;
