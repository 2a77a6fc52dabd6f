use std::io::Cursor;

use byteorder::WriteBytesExt;

use common::err::CResult;

use crate::utils::{read_len_enc_str_with_cursor_allow_null, write_len_enc_str};

/// One text-protocol row: a length-encoded string per column, 0xFB in the
/// length position for SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSetRowPacket {
    pub cells: Vec<Option<String>>,
}

impl ResultSetRowPacket {
    pub fn parse(payload: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(payload);

        let len = payload.len() as u64;
        let mut cells = Vec::new();

        while cursor.position() < len {
            cells.push(read_len_enc_str_with_cursor_allow_null(&mut cursor)?);
        }

        Ok(Self { cells })
    }

    pub fn serialize(&self) -> CResult<Vec<u8>> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        for cell in &self.cells {
            match cell {
                Some(value) => write_len_enc_str(&mut cursor, value)?,
                None => cursor.write_u8(0xFB)?,
            }
        }

        Ok(vec)
    }
}
