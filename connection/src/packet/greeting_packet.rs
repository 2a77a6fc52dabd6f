use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::declar::capability_flags::Capabilities;
use crate::declar::status_flags::StatusFlags;
use crate::utils::read_null_term_string_with_cursor;

/// The only handshake protocol version this driver speaks.
const PROTOCOL_VERSION: u8 = 10;

const SCRAMBLE_PART_1_LENGTH: usize = 8;
const RESERVED_LENGTH: usize = 10;

/// The server greeting that opens every connection.
///
/// Layout: protocol version, null-terminated server version, connection
/// id, scramble part 1 (8 bytes), filler, capability low word, charset,
/// status flags, capability high word, auth-data length, 10 reserved
/// bytes, null-terminated scramble part 2.
#[derive(Debug, Clone)]
pub struct GreetingPacket {
    pub server_version: String,
    pub connection_id: u32,
    /// The 20-character salt assembled from both scramble parts.
    pub scramble: String,
    pub server_capabilities: Capabilities,
    pub server_charset: u8,
    pub status_flags: StatusFlags,
}

impl GreetingPacket {
    pub fn parse(payload: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(payload);

        let protocol_version = cursor.read_u8()?;
        if protocol_version != PROTOCOL_VERSION {
            return Err(DriverError::Protocol(format!(
                "unsupported handshake protocol version {}",
                protocol_version
            )));
        }

        let server_version = read_null_term_string_with_cursor(&mut cursor)?;
        let connection_id = cursor.read_u32::<LittleEndian>()?;

        let mut scramble_part_1 = [0u8; SCRAMBLE_PART_1_LENGTH];
        cursor.read_exact(&mut scramble_part_1)?;
        let _filler = cursor.read_u8()?;

        let capability_low = cursor.read_u16::<LittleEndian>()?;
        let server_charset = cursor.read_u8()?;
        let status = cursor.read_u16::<LittleEndian>()?;
        let capability_high = cursor.read_u16::<LittleEndian>()?;
        let _auth_data_length = cursor.read_u8()?;

        let mut reserved = [0u8; RESERVED_LENGTH];
        cursor.read_exact(&mut reserved)?;

        let scramble_part_2 = read_null_term_string_with_cursor(&mut cursor)?;

        let mut scramble = String::from_utf8(scramble_part_1.to_vec())?;
        scramble.push_str(&scramble_part_2);

        Ok(Self {
            server_version,
            connection_id,
            scramble,
            server_capabilities: Capabilities::from_parts(capability_low, capability_high),
            server_charset,
            status_flags: StatusFlags::new(status),
        })
    }
}

#[cfg(test)]
mod test {
    use crate::declar::capability_flags::{
        CLIENT_PROTOCOL_41, CLIENT_SECURE_CONNECTION,
    };

    use super::*;

    fn greeting_payload(protocol_version: u8) -> Vec<u8> {
        let salt = b"0123456789abcdefghij";
        let mut payload = vec![protocol_version];
        payload.extend_from_slice(b"5.5.0\0");
        payload.extend_from_slice(&42u32.to_le_bytes());
        payload.extend_from_slice(&salt[..8]);
        payload.push(0); // filler
        payload.extend_from_slice(&0xF7FFu16.to_le_bytes());
        payload.push(8); // charset
        payload.extend_from_slice(&0x0002u16.to_le_bytes());
        payload.extend_from_slice(&0x0000u16.to_le_bytes());
        payload.push(21); // auth data length
        payload.extend_from_slice(&[0u8; 10]);
        payload.extend_from_slice(&salt[8..]);
        payload.push(0);
        payload
    }

    #[test]
    fn test_parse() {
        let packet = GreetingPacket::parse(&greeting_payload(10)).unwrap();
        assert_eq!(packet.server_version, "5.5.0");
        assert_eq!(packet.connection_id, 42);
        assert_eq!(packet.scramble, "0123456789abcdefghij");
        assert_eq!(packet.scramble.len(), 20);
        assert!(packet.server_capabilities.contains(CLIENT_PROTOCOL_41));
        assert!(packet.server_capabilities.contains(CLIENT_SECURE_CONNECTION));
        assert_eq!(packet.server_charset, 8);
    }

    #[test]
    fn test_rejects_unknown_protocol_version() {
        assert!(GreetingPacket::parse(&greeting_payload(9)).is_err());
    }
}
