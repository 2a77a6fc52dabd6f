use std::io;
use std::io::{Cursor, Write};

use byteorder::WriteBytesExt;
use sha1::{Digest, Sha1};

use crate::NULL_TERMINATOR;

pub fn write_null_term_string(
    cursor: &mut Cursor<&mut Vec<u8>>,
    str: &str,
) -> Result<(), io::Error> {
    cursor.write_all(str.as_bytes())?;
    cursor.write_u8(NULL_TERMINATOR)?;

    Ok(())
}

/// mysql_native_password auth response:
/// SHA1(password) XOR SHA1(scramble + SHA1(SHA1(password))).
/// An empty password authenticates with a zero-length response.
pub fn encrypt_password(password: &str, scramble: &str) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }

    let password_hash = sha1(password.as_bytes());
    let concat_hash = [scramble.as_bytes().to_vec(), sha1(&password_hash)].concat();
    xor(&password_hash, &sha1(&concat_hash))
}

pub fn xor(slice1: &[u8], slice2: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; slice1.len()];
    for i in 0..result.len() {
        result[i] = slice1[i] ^ slice2[i % slice2.len()];
    }
    result
}

pub fn sha1(value: &[u8]) -> Vec<u8> {
    let mut hasher = Sha1::new();
    hasher.update(value);
    hasher.finalize().as_slice().to_vec()
}

/// Diagnostic formatter: `ab_cd_ef` for the bytes from `offset` on.
pub fn hexdump(buffer: &[u8], offset: usize) -> String {
    let mut dump = String::new();
    if buffer.len() > offset {
        dump.push_str(&format!("{:02x}", buffer[offset]));
        for byte in &buffer[offset + 1..] {
            dump.push('_');
            dump.push_str(&format!("{:02x}", byte));
        }
    }
    dump
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_xor() {
        assert_eq!(xor(&[0xFF, 0x00, 0x0F], &[0x0F]), vec![0xF0, 0x0F, 0x00]);
        // the second slice wraps
        assert_eq!(xor(&[1, 2, 3, 4], &[1, 2]), vec![0, 0, 2, 6]);
    }

    #[test]
    fn test_encrypt_password_empty() {
        assert!(encrypt_password("", "0123456789abcdefghij").is_empty());
    }

    #[test]
    fn test_encrypt_password_shape() {
        let token = encrypt_password("secret", "0123456789abcdefghij");
        assert_eq!(token.len(), 20);
        // deterministic for a fixed scramble
        assert_eq!(token, encrypt_password("secret", "0123456789abcdefghij"));
        // and scramble-dependent
        assert_ne!(token, encrypt_password("secret", "jihgfedcba9876543210"));
    }

    #[test]
    fn test_sha1_len() {
        assert_eq!(sha1(b"abc").len(), 20);
    }

    #[test]
    fn test_hexdump() {
        assert_eq!(hexdump(&[0x01, 0xAB, 0xFF], 0), "01_ab_ff");
        assert_eq!(hexdump(&[0x01, 0xAB, 0xFF], 1), "ab_ff");
        assert_eq!(hexdump(&[0x01], 1), "");
    }

    #[test]
    fn test_write_null_term_string() {
        let mut vec = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut vec);
        write_null_term_string(&mut cursor, "root").unwrap();
        assert_eq!(vec, vec![b'r', b'o', b'o', b't', 0]);
    }
}
