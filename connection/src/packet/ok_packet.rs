use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Buf;

use common::err::CResult;

use crate::declar::status_flags::StatusFlags;
use crate::packet::response_type::ResponseType;
use crate::utils::read_len_enc_num;
use crate::utils::write_len_enc_num;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status_flags: StatusFlags,
    pub warnings: u16,
    pub info: String,
}

impl OkPacket {
    /// Servers may truncate the tail of short OK bodies; missing fields
    /// parse as zero.
    pub fn parse(payload: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(payload);

        let _header = cursor.read_u8()?;
        let mut affected_rows = 0;
        if cursor.has_remaining() {
            affected_rows = read_len_enc_num(&mut cursor)?.1;
        }
        let mut last_insert_id = 0;
        if cursor.has_remaining() {
            last_insert_id = read_len_enc_num(&mut cursor)?.1;
        }
        let mut status = 0u16;
        if cursor.remaining() >= 2 {
            status = cursor.read_u16::<LittleEndian>()?;
        }
        let mut warnings = 0u16;
        if cursor.remaining() >= 2 {
            warnings = cursor.read_u16::<LittleEndian>()?;
        }
        let mut info = String::new();
        cursor.read_to_string(&mut info)?;

        Ok(Self {
            affected_rows,
            last_insert_id,
            status_flags: StatusFlags::new(status),
            warnings,
            info,
        })
    }

    pub fn serialize(&self) -> CResult<Vec<u8>> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(ResponseType::OK)?;
        write_len_enc_num(&mut cursor, self.affected_rows)?;
        write_len_enc_num(&mut cursor, self.last_insert_id)?;
        cursor.write_u16::<LittleEndian>(self.status_flags.bits())?;
        cursor.write_u16::<LittleEndian>(self.warnings)?;
        cursor.write_all(self.info.as_bytes())?;

        Ok(vec)
    }
}

#[cfg(test)]
mod test {
    use crate::declar::status_flags::SERVER_STATUS_AUTOCOMMIT;

    use super::*;

    #[test]
    fn test_parse_handshake_ok() {
        // body of the OK frame `07 00 00 02 00 00 00 02 00 00 00`
        let payload = [0x00u8, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00];
        let packet = OkPacket::parse(&payload).unwrap();
        assert_eq!(packet.affected_rows, 0);
        assert_eq!(packet.last_insert_id, 0);
        assert!(packet.status_flags.contains(SERVER_STATUS_AUTOCOMMIT));
        assert_eq!(packet.warnings, 0);
        assert_eq!(packet.info, "");
    }

    #[test]
    fn test_parse_update_ok() {
        let payload = [0x00u8, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00];
        let packet = OkPacket::parse(&payload).unwrap();
        assert_eq!(packet.affected_rows, 3);
        assert_eq!(packet.last_insert_id, 0);
    }

    #[test]
    fn test_round_trip() {
        let packet = OkPacket {
            affected_rows: 260,
            last_insert_id: 99,
            status_flags: StatusFlags::new(SERVER_STATUS_AUTOCOMMIT),
            warnings: 1,
            info: "Rows matched: 260".to_string(),
        };
        let bytes = packet.serialize().unwrap();
        assert_eq!(OkPacket::parse(&bytes).unwrap(), packet);
    }
}
