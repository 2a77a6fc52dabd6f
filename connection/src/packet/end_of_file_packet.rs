use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use common::err::CResult;

use crate::packet::response_type::ResponseType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfFilePacket {
    pub warning_count: u16,
    pub server_status: u16,
}

impl EndOfFilePacket {
    pub fn parse(payload: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(payload);

        let _header = cursor.read_u8()?;
        let warning_count = cursor.read_u16::<LittleEndian>()?;
        let server_status = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            warning_count,
            server_status,
        })
    }

    /// 0xFE also prefixes 8-byte length-encoded integers; only payloads
    /// shorter than 9 bytes are EOF packets.
    pub fn is_eof(payload: &[u8]) -> bool {
        if payload.is_empty() || payload.len() >= 9 {
            return false;
        }
        payload[0] == ResponseType::END_OF_FILE
    }

    pub fn serialize(&self) -> CResult<Vec<u8>> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(ResponseType::END_OF_FILE)?;
        cursor.write_u16::<LittleEndian>(self.warning_count)?;
        cursor.write_u16::<LittleEndian>(self.server_status)?;

        Ok(vec)
    }
}
