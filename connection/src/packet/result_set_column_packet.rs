use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use common::err::CResult;

use crate::utils::{
    read_len_enc_num, read_len_enc_str_with_cursor, write_len_enc_num, write_len_enc_str,
};

/// Length of the fixed tail that follows the string fields.
const FIXED_FIELDS_LENGTH: u64 = 0x0C;

/// Column definition frame of the metadata phase of a text result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSetColumnPacket {
    pub catalog: String,
    pub schema: String,
    pub table: String,
    pub org_table: String,
    pub name: String,
    pub org_name: String,
    pub character_set: u16,
    pub column_length: u32,
    pub column_type: u8,
    pub flags: u16,
    pub decimals: u8,
}

impl ResultSetColumnPacket {
    pub fn parse(payload: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(payload);

        let catalog = read_len_enc_str_with_cursor(&mut cursor)?;
        let schema = read_len_enc_str_with_cursor(&mut cursor)?;
        let table = read_len_enc_str_with_cursor(&mut cursor)?;
        let org_table = read_len_enc_str_with_cursor(&mut cursor)?;
        let name = read_len_enc_str_with_cursor(&mut cursor)?;
        let org_name = read_len_enc_str_with_cursor(&mut cursor)?;
        let _fixed_length = read_len_enc_num(&mut cursor)?.1;
        let character_set = cursor.read_u16::<LittleEndian>()?;
        let column_length = cursor.read_u32::<LittleEndian>()?;
        let column_type = cursor.read_u8()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let decimals = cursor.read_u8()?;
        // two filler bytes close the frame

        Ok(Self {
            catalog,
            schema,
            table,
            org_table,
            name,
            org_name,
            character_set,
            column_length,
            column_type,
            flags,
            decimals,
        })
    }

    pub fn serialize(&self) -> CResult<Vec<u8>> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);

        write_len_enc_str(&mut cursor, &self.catalog)?;
        write_len_enc_str(&mut cursor, &self.schema)?;
        write_len_enc_str(&mut cursor, &self.table)?;
        write_len_enc_str(&mut cursor, &self.org_table)?;
        write_len_enc_str(&mut cursor, &self.name)?;
        write_len_enc_str(&mut cursor, &self.org_name)?;
        write_len_enc_num(&mut cursor, FIXED_FIELDS_LENGTH)?;
        cursor.write_u16::<LittleEndian>(self.character_set)?;
        cursor.write_u32::<LittleEndian>(self.column_length)?;
        cursor.write_u8(self.column_type)?;
        cursor.write_u16::<LittleEndian>(self.flags)?;
        cursor.write_u8(self.decimals)?;
        cursor.write_u16::<LittleEndian>(0)?;

        Ok(vec)
    }
}
