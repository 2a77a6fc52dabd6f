use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::packet::response_type::ResponseType;

/// Mid-query request asking the client to upload the named local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalInfilePacket {
    pub filename: String,
}

impl LocalInfilePacket {
    pub fn parse(payload: &[u8]) -> CResult<Self> {
        if payload.first() != Some(&ResponseType::LOCAL_INFILE) {
            return Err(DriverError::Protocol(
                "not a local infile request packet".to_string(),
            ));
        }

        Ok(Self {
            filename: String::from_utf8_lossy(&payload[1..]).to_string(),
        })
    }
}
