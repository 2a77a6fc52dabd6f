use std::io::{self, Cursor};

use byteorder::WriteBytesExt;

use crate::commands::command::CommandType;

pub struct PingCommand;

impl PingCommand {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        cursor.write_u8(CommandType::Ping as u8)?;

        Ok(vec)
    }
}

impl Default for PingCommand {
    fn default() -> Self {
        PingCommand::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_serialize() {
        assert_eq!(PingCommand::new().serialize().unwrap(), vec![0x0E]);
    }
}
