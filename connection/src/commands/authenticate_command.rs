use std::io::{self, Cursor, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::bytes::{encrypt_password, write_null_term_string};
use crate::conn::connection_options::ConnectionOptions;
use crate::declar::capability_flags::{Capabilities, CLIENT_CONNECT_WITH_DB};
use crate::packet::greeting_packet::GreetingPacket;
use crate::{MAX_PACKET_SIZE, UTF8_GENERAL_CI};

/// Reserved zero bytes between the fixed head and the username.
const RESERVED_LENGTH: usize = 23;

/// The handshake response: capability word, max packet size, collation,
/// 23 reserved bytes, null-terminated username, length-prefixed auth
/// response and, under CLIENT_CONNECT_WITH_DB, the null-terminated
/// database name.
pub struct AuthenticateCommand {
    pub client_capabilities: Capabilities,
    pub max_packet_size: u32,
    pub client_collation: u8,
    pub username: String,
    pub password: String,
    pub database: Option<String>,
    pub scramble: String,
}

impl AuthenticateCommand {
    pub fn new(
        options: &ConnectionOptions,
        greeting: &GreetingPacket,
        client_capabilities: Capabilities,
    ) -> Self {
        Self {
            client_capabilities,
            max_packet_size: MAX_PACKET_SIZE,
            client_collation: UTF8_GENERAL_CI,
            username: options.username.clone(),
            password: options.password.clone(),
            database: options.database.clone(),
            scramble: greeting.scramble.clone(),
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u32::<LittleEndian>(self.client_capabilities.bits())?;
        cursor.write_u32::<LittleEndian>(self.max_packet_size)?;
        cursor.write_u8(self.client_collation)?;

        for _ in 0..RESERVED_LENGTH {
            cursor.write_u8(0)?;
        }

        write_null_term_string(&mut cursor, &self.username)?;

        let auth_response = encrypt_password(&self.password, &self.scramble);
        cursor.write_u8(auth_response.len() as u8)?;
        cursor.write_all(&auth_response)?;

        if self.client_capabilities.contains(CLIENT_CONNECT_WITH_DB) {
            if let Some(database) = &self.database {
                write_null_term_string(&mut cursor, database)?;
            }
        }

        Ok(vec)
    }
}

#[cfg(test)]
mod test {
    use crate::declar::capability_flags::{
        CLIENT_PROTOCOL_41, CLIENT_SECURE_CONNECTION,
    };

    use super::*;

    fn command(database: Option<&str>, with_db_flag: bool) -> AuthenticateCommand {
        let mut capabilities = Capabilities::empty();
        capabilities
            .insert(CLIENT_PROTOCOL_41)
            .insert(CLIENT_SECURE_CONNECTION);
        if with_db_flag {
            capabilities.insert(CLIENT_CONNECT_WITH_DB);
        }
        AuthenticateCommand {
            client_capabilities: capabilities,
            max_packet_size: MAX_PACKET_SIZE,
            client_collation: UTF8_GENERAL_CI,
            username: "root".to_string(),
            password: String::new(),
            database: database.map(str::to_string),
            scramble: "0123456789abcdefghij".to_string(),
        }
    }

    #[test]
    fn test_serialize_empty_password() {
        let bytes = command(None, false).serialize().unwrap();

        let capability_word = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        assert_ne!(capability_word & CLIENT_PROTOCOL_41, 0);
        assert_ne!(capability_word & CLIENT_SECURE_CONNECTION, 0);
        assert_eq!(capability_word & CLIENT_CONNECT_WITH_DB, 0);

        let max_packet = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        assert_eq!(max_packet, 0x0100_0000);
        assert_eq!(bytes[8], UTF8_GENERAL_CI);
        assert_eq!(&bytes[9..32], &[0u8; 23]);
        assert_eq!(&bytes[32..37], b"root\0");
        // zero-length auth response
        assert_eq!(bytes[37], 0x00);
        assert_eq!(bytes.len(), 38);
    }

    #[test]
    fn test_serialize_with_database() {
        let bytes = command(Some("test"), true).serialize().unwrap();
        assert_eq!(&bytes[bytes.len() - 5..], b"test\0");
    }

    #[test]
    fn test_database_needs_the_capability() {
        let bytes = command(Some("test"), false).serialize().unwrap();
        // without CLIENT_CONNECT_WITH_DB the tail stops after the token
        assert_eq!(bytes[37], 0x00);
        assert_eq!(bytes.len(), 38);
    }
}
