use std::io::{self, Cursor};

use byteorder::WriteBytesExt;

use crate::commands::command::CommandType;

/// COM_QUIT closes the exchange; the server answers with nothing.
pub struct QuitCommand;

impl QuitCommand {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(CommandType::Quit as u8)?;

        Ok(vec)
    }
}

impl Default for QuitCommand {
    fn default() -> Self {
        QuitCommand::new()
    }
}
