use std::io::Cursor;

use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::packet::end_of_file_packet::EndOfFilePacket;
use crate::packet::error_packet::ErrorPacket;
use crate::packet::local_infile_packet::LocalInfilePacket;
use crate::packet::ok_packet::OkPacket;
use crate::packet::response_type::ResponseType;
use crate::utils::read_len_enc_num;

pub mod end_of_file_packet;
pub mod error_packet;
pub mod greeting_packet;
pub mod local_infile_packet;
pub mod ok_packet;
pub mod response_type;
pub mod result_set_column_packet;
pub mod result_set_row_packet;

/// One physical frame: payload plus the sequence number it arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub payload: Vec<u8>,
    pub seq: u8,
}

/// The packets a server may answer a command with.
#[derive(Debug)]
pub enum ResponsePacket {
    Ok(OkPacket),
    Error(ErrorPacket),
    Eof(EndOfFilePacket),
    /// Field count of the result set that follows.
    ResultSetHeader(u64),
    LocalInfile(LocalInfilePacket),
}

/// Classify a response-position payload by its first byte: 0x00 OK,
/// 0xFF ERR, 0xFE with a short body EOF, 0xFB a LOCAL INFILE request,
/// anything else the length-encoded field count of a result set.
pub fn parse_response(payload: &[u8]) -> CResult<ResponsePacket> {
    let first = match payload.first() {
        Some(first) => *first,
        None => {
            return Err(DriverError::Protocol(
                "zero-length response packet".to_string(),
            ))
        }
    };

    match first {
        ResponseType::OK => Ok(ResponsePacket::Ok(OkPacket::parse(payload)?)),
        ResponseType::ERROR => Ok(ResponsePacket::Error(ErrorPacket::parse(payload)?)),
        ResponseType::END_OF_FILE if payload.len() < 9 => {
            Ok(ResponsePacket::Eof(EndOfFilePacket::parse(payload)?))
        }
        ResponseType::LOCAL_INFILE => Ok(ResponsePacket::LocalInfile(LocalInfilePacket::parse(
            payload,
        )?)),
        _ => {
            let mut cursor = Cursor::new(payload);
            let (_, field_count) = read_len_enc_num(&mut cursor)?;
            Ok(ResponsePacket::ResultSetHeader(field_count))
        }
    }
}

/// Fail with the server's message when the payload is an ERR packet.
pub fn check_error_packet(payload: &[u8], message: &str) -> CResult<()> {
    if payload.first() == Some(&ResponseType::ERROR) {
        let error = ErrorPacket::parse(payload)?;
        return Err(DriverError::Connection(format!(
            "{} {}",
            message,
            error.message
        )));
    }

    Ok(())
}
