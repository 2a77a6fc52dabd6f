use std::io::{self, Cursor, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::commands::command::CommandType;

/// COM_BINLOG_DUMP: position, flags, server id and the binlog filename.
pub struct DumpBinlogCommand {
    pub server_id: u32,
    pub binlog_filename: String,
    pub binlog_position: u32,
    pub flags: u16,
}

impl DumpBinlogCommand {
    pub fn new<S: Into<String>>(server_id: u32, binlog_filename: S, binlog_position: u32) -> Self {
        Self {
            server_id,
            binlog_filename: binlog_filename.into(),
            binlog_position,
            flags: 0,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(CommandType::BinlogDump as u8)?;
        cursor.write_u32::<LittleEndian>(self.binlog_position)?;
        cursor.write_u16::<LittleEndian>(self.flags)?;
        cursor.write_u32::<LittleEndian>(self.server_id)?;
        cursor.write_all(self.binlog_filename.as_bytes())?;

        Ok(vec)
    }
}
