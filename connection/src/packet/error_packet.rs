use std::io::{Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Buf;

use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::packet::response_type::ResponseType;

const SQL_STATE_MARKER: u8 = b'#';
const SQL_STATE_LENGTH: usize = 5;

/// Fallback SQLSTATE for pre-4.1 ERR packets without the `#` marker.
const DEFAULT_SQL_STATE: &str = "HY000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPacket {
    pub error_number: u16,
    /// Only present when the server sent the `#`-marked form.
    pub sql_state_marker: Option<String>,
    pub message: String,
}

impl ErrorPacket {
    pub fn parse(payload: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(payload);

        let _header = cursor.read_u8()?;
        let error_number = cursor.read_u16::<LittleEndian>()?;

        let mut sql_state_marker = None;
        if cursor.remaining() > SQL_STATE_LENGTH && payload[cursor.position() as usize] == SQL_STATE_MARKER {
            cursor.advance(1);
            let start = cursor.position() as usize;
            let state = &payload[start..start + SQL_STATE_LENGTH];
            cursor.advance(SQL_STATE_LENGTH);
            sql_state_marker = Some(String::from_utf8_lossy(state).to_string());
        }

        let message =
            String::from_utf8_lossy(&payload[cursor.position() as usize..]).to_string();

        Ok(Self {
            error_number,
            sql_state_marker,
            message,
        })
    }

    pub fn sql_state(&self) -> &str {
        self.sql_state_marker.as_deref().unwrap_or(DEFAULT_SQL_STATE)
    }

    pub fn serialize(&self) -> CResult<Vec<u8>> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(ResponseType::ERROR)?;
        cursor.write_u16::<LittleEndian>(self.error_number)?;
        if let Some(state) = &self.sql_state_marker {
            cursor.write_u8(SQL_STATE_MARKER)?;
            cursor.write_all(state.as_bytes())?;
        }
        cursor.write_all(self.message.as_bytes())?;

        Ok(vec)
    }
}

impl From<ErrorPacket> for DriverError {
    fn from(packet: ErrorPacket) -> Self {
        let sql_state = packet.sql_state().to_string();
        DriverError::Query {
            message: packet.message,
            error_number: packet.error_number,
            sql_state,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_with_sql_state() {
        let mut payload = vec![0xFFu8, 0x7A, 0x04, b'#'];
        payload.extend_from_slice(b"42S02");
        payload.extend_from_slice(b"Table doesn't exist");

        let packet = ErrorPacket::parse(&payload).unwrap();
        assert_eq!(packet.error_number, 1146);
        assert_eq!(packet.sql_state(), "42S02");
        assert_eq!(packet.message, "Table doesn't exist");
    }

    #[test]
    fn test_parse_without_sql_state() {
        let mut payload = vec![0xFFu8, 0x28, 0x04];
        payload.extend_from_slice(b"Unknown thing");

        let packet = ErrorPacket::parse(&payload).unwrap();
        assert_eq!(packet.error_number, 1064);
        assert_eq!(packet.sql_state(), "HY000");
        assert_eq!(packet.message, "Unknown thing");
    }

    #[test]
    fn test_round_trip() {
        for packet in [
            ErrorPacket {
                error_number: 1146,
                sql_state_marker: Some("42S02".to_string()),
                message: "Table doesn't exist".to_string(),
            },
            ErrorPacket {
                error_number: 1064,
                sql_state_marker: None,
                message: "You have an error in your SQL syntax".to_string(),
            },
        ] {
            let bytes = packet.serialize().unwrap();
            assert_eq!(ErrorPacket::parse(&bytes).unwrap(), packet);
        }
    }

    #[test]
    fn test_into_query_error() {
        let packet = ErrorPacket {
            error_number: 1146,
            sql_state_marker: Some("42S02".to_string()),
            message: "Table doesn't exist".to_string(),
        };
        match DriverError::from(packet) {
            DriverError::Query {
                message,
                error_number,
                sql_state,
            } => {
                assert_eq!(message, "Table doesn't exist");
                assert_eq!(error_number, 1146);
                assert_eq!(sql_state, "42S02");
            }
            other => panic!("expected a query error, got {:?}", other),
        }
    }
}
