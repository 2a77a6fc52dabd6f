use std::io::{self, Cursor, Write};

use byteorder::WriteBytesExt;

use crate::commands::command::CommandType;

pub struct QueryCommand {
    pub sql: String,
}

impl QueryCommand {
    pub fn new<S: Into<String>>(sql: S) -> Self {
        Self { sql: sql.into() }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(CommandType::Query as u8)?;
        cursor.write_all(self.sql.as_bytes())?;

        Ok(vec)
    }
}
