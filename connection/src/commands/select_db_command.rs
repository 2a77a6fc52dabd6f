use std::io::{self, Cursor, Write};

use byteorder::WriteBytesExt;

use crate::commands::command::CommandType;

/// COM_INIT_DB switches the default schema of the connection.
pub struct SelectDbCommand {
    pub database: String,
}

impl SelectDbCommand {
    pub fn new<S: Into<String>>(database: S) -> Self {
        Self {
            database: database.into(),
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(CommandType::InitDb as u8)?;
        cursor.write_all(self.database.as_bytes())?;

        Ok(vec)
    }
}
