use std::io::{BufRead, Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::NULL_TERMINATOR;

/// parse len encoded int, return (used_bytes, value).
///
/// if first byte is less than 0xFB - Integer value is this 1 byte integer
/// 0xFB - NULL value
/// 0xFC - Integer value is encoded in the next 2 bytes (3 bytes total)
/// 0xFD - Integer value is encoded in the next 3 bytes (4 bytes total)
/// 0xFE - Integer value is encoded in the next 8 bytes (9 bytes total)
///
/// ref: https://dev.mysql.com/doc/internals/en/integer.html#packet-Protocol::LengthEncodedInteger
pub fn read_len_enc_num(cursor: &mut Cursor<&[u8]>) -> CResult<(usize, u64)> {
    let first_byte = cursor.read_u8()?;

    // 0 -- 250
    if first_byte < 0xFB {
        Ok((1, first_byte as u64))
    } else if first_byte == 0xFB { // 251
        Err(DriverError::Protocol(
            "Length encoded integer cannot be NULL.".to_string(),
        ))
    } else if first_byte == 0xFC { // 252
        Ok((3, cursor.read_u16::<LittleEndian>()? as u64))
    } else if first_byte == 0xFD { // 253
        Ok((4, cursor.read_u24::<LittleEndian>()? as u64))
    } else if first_byte == 0xFE { // 254
        Ok((9, cursor.read_u64::<LittleEndian>()?))
    } else {
        let value = format!("Unexpected length-encoded integer: {}", first_byte);
        Err(DriverError::Protocol(value))
    }
}

/// write len encoded int, the mirror image of [`read_len_enc_num`].
pub fn write_len_enc_num(cursor: &mut Cursor<&mut Vec<u8>>, value: u64) -> CResult<()> {
    if value < 0xFB {
        cursor.write_u8(value as u8)?;
    } else if value <= 0xFFFF {
        cursor.write_u8(0xFC)?;
        cursor.write_u16::<LittleEndian>(value as u16)?;
    } else if value <= 0xFF_FFFF {
        cursor.write_u8(0xFD)?;
        cursor.write_u24::<LittleEndian>(value as u32)?;
    } else {
        cursor.write_u8(0xFE)?;
        cursor.write_u64::<LittleEndian>(value)?;
    }
    Ok(())
}

pub fn read_string(cursor: &mut Cursor<&[u8]>, size: usize) -> CResult<String> {
    let mut vec = vec![0; size];
    cursor.read_exact(&mut vec)?;

    Ok(String::from_utf8_lossy(&vec).to_string())
}

/// parse length encoded string
///
/// ref: https://dev.mysql.com/doc/internals/en/string.html#packet-Protocol::LengthEncodedString
pub fn read_len_enc_str_with_cursor(cursor: &mut Cursor<&[u8]>) -> CResult<String> {
    let (_, length) = read_len_enc_num(cursor)?;

    read_string(cursor, length as usize)
}

/// Read a length encoded string, 0xFB in the length position is SQL NULL.
pub fn read_len_enc_str_with_cursor_allow_null(
    cursor: &mut Cursor<&[u8]>,
) -> CResult<Option<String>> {
    let first_byte = cursor.read_u8()?;

    let length;
    // 0 -- 250
    if first_byte < 0xFB {
        length = first_byte as u64;
    } else if first_byte == 0xFB { // 251
        return Ok(None);
    } else if first_byte == 0xFC { // 252
        length = cursor.read_u16::<LittleEndian>()? as u64;
    } else if first_byte == 0xFD { // 253
        length = cursor.read_u24::<LittleEndian>()? as u64;
    } else if first_byte == 0xFE { // 254
        length = cursor.read_u64::<LittleEndian>()?;
    } else {
        let value = format!("Unexpected length-encoded integer: {}", first_byte);
        return Err(DriverError::Protocol(value));
    }
    Ok(Some(read_string(cursor, length as usize)?))
}

/// write a length encoded string.
pub fn write_len_enc_str(cursor: &mut Cursor<&mut Vec<u8>>, value: &str) -> CResult<()> {
    write_len_enc_num(cursor, value.len() as u64)?;
    cursor.write_all(value.as_bytes())?;
    Ok(())
}

/// parse 'null terminated string', consume the null byte
///
/// ref: https://dev.mysql.com/doc/internals/en/string.html#packet-Protocol::NulTerminatedString
pub fn read_null_term_string_with_cursor(cursor: &mut Cursor<&[u8]>) -> CResult<String> {
    let mut vec = Vec::new();
    cursor.read_until(NULL_TERMINATOR, &mut vec)?;
    if vec.last() == Some(&NULL_TERMINATOR) {
        vec.pop();
    }
    Ok(String::from_utf8(vec)?)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    fn encode_num(value: u64) -> Vec<u8> {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);
        write_len_enc_num(&mut cursor, value).unwrap();
        vec
    }

    #[test]
    fn test_len_enc_num_round_trip() {
        for value in [0u64, 1, 250, 251, 65535, 65536, 0xFF_FFFF, 0x100_0000, u64::MAX] {
            let encoded = encode_num(value);
            let mut cursor = Cursor::new(encoded.as_slice());
            let (used, decoded) = read_len_enc_num(&mut cursor).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(used, encoded.len());
        }
    }

    #[test]
    fn test_len_enc_num_prefix_property() {
        // decode then re-encode reproduces the consumed prefix
        for bytes in [
            vec![0x0Au8],
            vec![0xFC, 0x10, 0x27],
            vec![0xFD, 0x01, 0x02, 0x03],
            vec![0xFE, 1, 2, 3, 4, 5, 6, 7, 8],
        ] {
            let mut cursor = Cursor::new(bytes.as_slice());
            let (used, value) = read_len_enc_num(&mut cursor).unwrap();
            assert_eq!(encode_num(value), bytes[..used].to_vec());
        }
    }

    #[test]
    fn test_len_enc_num_rejects_null_marker() {
        let bytes = [0xFBu8];
        let mut cursor = Cursor::new(&bytes[..]);
        assert!(read_len_enc_num(&mut cursor).is_err());
    }

    #[test]
    fn test_len_enc_str() {
        let mut vec = Vec::new();
        let mut cursor = Cursor::new(&mut vec);
        write_len_enc_str(&mut cursor, "hello").unwrap();
        assert_eq!(vec, vec![5, b'h', b'e', b'l', b'l', b'o']);

        let mut cursor = Cursor::new(vec.as_slice());
        assert_eq!(read_len_enc_str_with_cursor(&mut cursor).unwrap(), "hello");
    }

    #[test]
    fn test_len_enc_str_null_cell() {
        let bytes = [0xFBu8, 0x01, b'x'];
        let mut cursor = Cursor::new(&bytes[..]);
        assert_eq!(
            read_len_enc_str_with_cursor_allow_null(&mut cursor).unwrap(),
            None
        );
        assert_eq!(
            read_len_enc_str_with_cursor_allow_null(&mut cursor).unwrap(),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_null_term_string() {
        let bytes = [b'5', b'.', b'5', b'.', b'0', 0, b'z'];
        let mut cursor = Cursor::new(&bytes[..]);
        assert_eq!(
            read_null_term_string_with_cursor(&mut cursor).unwrap(),
            "5.5.0"
        );
        assert_eq!(cursor.position(), 6);
    }
}
