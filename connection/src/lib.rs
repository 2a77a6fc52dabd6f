pub mod binlog;
pub mod commands;
pub mod conn;
pub mod declar;
pub mod packet;

pub mod bytes;
pub mod utils;

///Packet constants
pub const PACKET_HEADER_SIZE: usize = 4;
pub const MAX_BODY_LENGTH: usize = 16_777_215;
pub const NULL_TERMINATOR: u8 = 0;
pub const UTF8_GENERAL_CI: u8 = 33;

/// Max packet size announced in the handshake response (16 MiB).
pub const MAX_PACKET_SIZE: u32 = 0x0100_0000;

/// Capacity of the buffered reader/writer halves of the channel.
pub const CHANNEL_BUFFER_SIZE: usize = 32_768;
