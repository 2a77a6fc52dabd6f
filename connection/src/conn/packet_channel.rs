use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::trace;

use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::bytes::hexdump;
use crate::conn::connection_options::ConnectionOptions;
use crate::packet::RawPacket;
use crate::{CHANNEL_BUFFER_SIZE, MAX_BODY_LENGTH, PACKET_HEADER_SIZE};

/// Framing layer over one TCP stream: 3-byte little-endian payload length,
/// 1-byte sequence number, payload. The channel owns the sequence counter;
/// every inbound frame must carry the expected successor number and every
/// outbound frame is stamped with the counter before it advances.
#[derive(Debug)]
pub struct PacketChannel {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    sequence: u8,
}

impl PacketChannel {
    pub fn connect(options: &ConnectionOptions) -> CResult<Self> {
        let address = format!("{}:{}", options.hostname, options.port);
        let stream = TcpStream::connect(address)?;
        let reader = BufReader::with_capacity(CHANNEL_BUFFER_SIZE, stream.try_clone()?);
        let writer = BufWriter::with_capacity(CHANNEL_BUFFER_SIZE, stream);

        Ok(Self {
            reader,
            writer,
            sequence: 0,
        })
    }

    /// The executor calls this at the start of every client-initiated
    /// command exchange.
    pub fn reset_sequence(&mut self) {
        self.sequence = 0;
    }

    /// Read one physical frame. Continuation frames of an oversized logical
    /// message are NOT joined here; the result-set reader concatenates them.
    pub fn read_packet(&mut self) -> CResult<RawPacket> {
        let mut header_buffer = [0; PACKET_HEADER_SIZE];

        self.reader.read_exact(&mut header_buffer)?;
        let packet_size = (&header_buffer[0..3]).read_u24::<LittleEndian>()?;
        let seq = header_buffer[3];

        if seq != self.sequence {
            return Err(DriverError::Protocol(format!(
                "out of order packet: expected sequence {}, got {}",
                self.sequence, seq
            )));
        }
        self.sequence = self.sequence.wrapping_add(1);

        let mut payload: Vec<u8> = vec![0; packet_size as usize];
        self.reader.read_exact(&mut payload)?;

        Ok(RawPacket { payload, seq })
    }

    /// Write one physical frame stamped with the current sequence number.
    /// The payload must fit a single frame; `write_message` splits longer
    /// ones.
    pub fn write_packet(&mut self, payload: &[u8]) -> CResult<()> {
        if payload.len() > MAX_BODY_LENGTH {
            return Err(DriverError::Protocol(format!(
                "payload of {} bytes does not fit one frame",
                payload.len()
            )));
        }

        let mut header = [0u8; PACKET_HEADER_SIZE];
        (&mut header[0..3]).write_u24::<LittleEndian>(payload.len() as u32)?;
        header[3] = self.sequence;
        trace!("sending packet header {}", hexdump(&header, 0));

        self.writer.write_all(&header)?;
        self.writer.write_all(payload)?;
        self.sequence = self.sequence.wrapping_add(1);

        Ok(())
    }

    /// Split a logical message into maximum-size frames with consecutive
    /// sequence numbers. A message whose length is an exact multiple of the
    /// frame capacity is terminated by a zero-length frame.
    pub fn write_message(&mut self, payload: &[u8]) -> CResult<()> {
        if payload.is_empty() {
            return self.write_packet(&[]);
        }

        for chunk in payload.chunks(MAX_BODY_LENGTH) {
            self.write_packet(chunk)?;
        }
        if payload.len() % MAX_BODY_LENGTH == 0 {
            self.write_packet(&[])?;
        }

        Ok(())
    }

    /// Start a command exchange: reset the counter, frame the payload and
    /// flush at the command boundary.
    pub fn write_command(&mut self, payload: &[u8]) -> CResult<()> {
        self.reset_sequence();
        self.write_message(payload)?;
        self.flush()
    }

    pub fn flush(&mut self) -> CResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn shutdown(&mut self) -> CResult<()> {
        self.writer.flush().ok();
        self.writer.get_ref().shutdown(Shutdown::Both)?;
        Ok(())
    }
}
