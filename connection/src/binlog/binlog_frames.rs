use tracing::debug;

use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::conn::connection::Connection;
use crate::packet::end_of_file_packet::EndOfFilePacket;
use crate::packet::error_packet::ErrorPacket;
use crate::packet::response_type::ResponseType;
use crate::packet::RawPacket;

/// Lazy stream of raw binlog frames, read one packet at a time from the
/// dump reply. Frames are surfaced verbatim; the caller downstream parses
/// the replication events. The server's EOF packet ends the stream.
///
/// The dump has no resynchronization point, so dropping the stream before
/// EOF poisons the connection.
pub struct BinlogFrames<'a> {
    conn: &'a mut Connection,
    done: bool,
}

impl<'a> BinlogFrames<'a> {
    pub(crate) fn new(conn: &'a mut Connection) -> Self {
        Self { conn, done: false }
    }

    fn read_error(&mut self, payload: &[u8]) -> CResult<RawPacket> {
        let error = ErrorPacket::parse(payload)?;
        Err(error.into())
    }
}

impl Iterator for BinlogFrames<'_> {
    type Item = CResult<RawPacket>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let packet = match self.conn.read_raw_frame() {
            Ok(packet) => packet,
            Err(err) => {
                self.done = true;
                self.conn.poison();
                return Some(Err(DriverError::BinlogDump(format!(
                    "Could not read binlog: {}",
                    err
                ))));
            }
        };

        match packet.payload.first() {
            Some(&ResponseType::ERROR) => {
                self.done = true;
                Some(self.read_error(&packet.payload))
            }
            Some(&ResponseType::END_OF_FILE) if EndOfFilePacket::is_eof(&packet.payload) => {
                debug!("binlog dump complete");
                self.done = true;
                None
            }
            Some(_) => Some(Ok(packet)),
            None => {
                self.done = true;
                self.conn.poison();
                Some(Err(DriverError::BinlogDump(
                    "zero-length frame in the dump stream".to_string(),
                )))
            }
        }
    }
}

impl Drop for BinlogFrames<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.conn.poison();
        }
    }
}
