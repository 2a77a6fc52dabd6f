use std::io::{BufReader, Read};
use std::mem;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::binlog::binlog_frames::BinlogFrames;
use crate::commands::authenticate_command::AuthenticateCommand;
use crate::commands::dump_binlog_command::DumpBinlogCommand;
use crate::commands::ping_command::PingCommand;
use crate::commands::query_command::QueryCommand;
use crate::commands::quit_command::QuitCommand;
use crate::commands::select_db_command::SelectDbCommand;
use crate::conn::connection_options::{ConnectionOptions, DriverConfig};
use crate::conn::database_family::DatabaseFamily;
use crate::conn::packet_channel::PacketChannel;
use crate::conn::query_result::{ColumnInformation, QueryResult, ResultSet, Row};
use crate::declar::capability_flags::{
    Capabilities, CLIENT_CONNECT_WITH_DB, CLIENT_IGNORE_SPACE, CLIENT_LOCAL_FILES,
    CLIENT_LONG_PASSWORD, CLIENT_PROTOCOL_41, CLIENT_SECURE_CONNECTION, CLIENT_TRANSACTIONS,
};
use crate::packet::end_of_file_packet::EndOfFilePacket;
use crate::packet::error_packet::ErrorPacket;
use crate::packet::greeting_packet::GreetingPacket;
use crate::packet::response_type::ResponseType;
use crate::packet::result_set_column_packet::ResultSetColumnPacket;
use crate::packet::result_set_row_packet::ResultSetRowPacket;
use crate::packet::{check_error_packet, parse_response, RawPacket, ResponsePacket};
use crate::MAX_BODY_LENGTH;

/// One connection, one socket, one command in flight. The protocol is
/// half-duplex; callers that share a connection must serialize externally.
///
/// A transport- or protocol-level fault poisons the connection: every
/// later operation fails without touching the socket until `close`.
#[derive(Debug)]
pub struct Connection {
    options: ConnectionOptions,
    config: DriverConfig,
    channel: PacketChannel,
    server_version: String,
    server_capabilities: Capabilities,
    connected: bool,
    poisoned: bool,
    read_only: bool,
    batch: Vec<String>,
}

impl Connection {
    /// Open the socket and complete the handshake; the connection is
    /// usable iff this returns Ok.
    #[instrument(skip(options))]
    pub fn connect(options: ConnectionOptions) -> CResult<Self> {
        let config = options.config();
        let mut channel = PacketChannel::connect(&options)?;

        let (server_version, server_capabilities) =
            match Self::handshake(&mut channel, &options, &config) {
                Ok(greeting) => greeting,
                Err(err) => {
                    // tear the socket down before surfacing the failure
                    let _ = channel.shutdown();
                    return Err(err);
                }
            };

        debug!("connected to server version {}", server_version);

        let mut connection = Self {
            options,
            config,
            channel,
            server_version,
            server_capabilities,
            connected: true,
            poisoned: false,
            read_only: false,
            batch: Vec::new(),
        };

        if config.create_db {
            if let Some(database) = connection.options.database.clone() {
                connection.execute_query(&format!("CREATE DATABASE IF NOT EXISTS {}", database))?;
                connection.execute_query(&format!("USE {}", database))?;
            }
        }

        Ok(connection)
    }

    fn handshake(
        channel: &mut PacketChannel,
        options: &ConnectionOptions,
        config: &DriverConfig,
    ) -> CResult<(String, Capabilities)> {
        let packet = channel.read_packet()?;
        check_error_packet(&packet.payload, "Initial handshake error.")?;
        let greeting = GreetingPacket::parse(&packet.payload)?;

        for required in [CLIENT_PROTOCOL_41, CLIENT_SECURE_CONNECTION] {
            if !greeting.server_capabilities.contains(required) {
                return Err(DriverError::Protocol(format!(
                    "server {} does not offer capability {:#06x}",
                    greeting.server_version, required
                )));
            }
        }

        let client_capabilities = Self::select_capabilities(options, config);
        let auth_command = AuthenticateCommand::new(options, &greeting, client_capabilities);
        channel.write_packet(&auth_command.serialize()?)?;
        channel.flush()?;

        let reply = channel.read_packet()?;
        match parse_response(&reply.payload)? {
            ResponsePacket::Ok(_) => Ok((greeting.server_version, greeting.server_capabilities)),
            ResponsePacket::Error(error) => Err(DriverError::Connection(format!(
                "Could not connect: {}",
                error.message
            ))),
            _ => Err(DriverError::Protocol(
                "unexpected authentication reply".to_string(),
            )),
        }
    }

    /// The client's side of the capability negotiation. The database name
    /// is only negotiated into the handshake when it is not going to be
    /// created afterwards.
    fn select_capabilities(options: &ConnectionOptions, config: &DriverConfig) -> Capabilities {
        let mut capabilities = Capabilities::empty();
        capabilities
            .insert(CLIENT_LONG_PASSWORD)
            .insert(CLIENT_IGNORE_SPACE)
            .insert(CLIENT_PROTOCOL_41)
            .insert(CLIENT_TRANSACTIONS)
            .insert(CLIENT_SECURE_CONNECTION)
            .insert(CLIENT_LOCAL_FILES);

        if options.database.is_some() && !config.create_db {
            capabilities.insert(CLIENT_CONNECT_WITH_DB);
        }

        capabilities
    }

    /// Execute one textual query and read its full response.
    #[instrument(skip(self))]
    pub fn execute_query(&mut self, sql: &str) -> CResult<QueryResult> {
        self.ensure_usable()?;
        let result = self.run_query(sql, None::<std::io::Empty>);
        self.seal(result)
    }

    /// Execute a query that is expected to trigger a LOCAL INFILE request;
    /// `file` is streamed to the server one chunk at a time.
    #[instrument(skip(self, file))]
    pub fn execute_query_with_file<R: Read>(&mut self, sql: &str, file: R) -> CResult<QueryResult> {
        self.ensure_usable()?;
        let result = self.run_query(sql, Some(file));
        self.seal(result)
    }

    fn run_query<R: Read>(&mut self, sql: &str, file: Option<R>) -> CResult<QueryResult> {
        let command = QueryCommand::new(sql);
        self.channel.write_command(&command.serialize()?)?;

        let payload = self.read_response_payload()?;
        match parse_response(&payload)? {
            ResponsePacket::Ok(ok) => Ok(QueryResult::from(ok)),
            ResponsePacket::Error(error) => {
                warn!("could not execute query: {}", error.message);
                Err(error.into())
            }
            ResponsePacket::ResultSetHeader(field_count) => self.read_result_set(field_count),
            ResponsePacket::LocalInfile(request) => match file {
                Some(file) => self.send_local_infile(file),
                None => Err(DriverError::Protocol(format!(
                    "server requested local file {:?} but no stream was supplied",
                    request.filename
                ))),
            },
            ResponsePacket::Eof(_) => Err(DriverError::Protocol(
                "unexpected EOF packet in response position".to_string(),
            )),
        }
    }

    /// Column-metadata phase, then rows until EOF or ERR. A result set of
    /// F fields and R rows consumes exactly F + 1 + R + 1 frames.
    fn read_result_set(&mut self, field_count: u64) -> CResult<QueryResult> {
        let mut columns: Vec<ColumnInformation> = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let packet = self.channel.read_packet()?;
            if packet.payload.first() == Some(&ResponseType::ERROR) {
                return Err(ErrorPacket::parse(&packet.payload)?.into());
            }
            let column = ResultSetColumnPacket::parse(&packet.payload)?;
            columns.push(column.into());
        }

        // terminator of the column-definition phase
        let _ = self.channel.read_packet()?;

        let columns: Arc<[ColumnInformation]> = Arc::from(columns);
        let mut rows = Vec::new();
        loop {
            let payload = self.read_response_payload()?;
            if payload.first() == Some(&ResponseType::ERROR) {
                return Err(ErrorPacket::parse(&payload)?.into());
            }
            if EndOfFilePacket::is_eof(&payload) {
                let eof = EndOfFilePacket::parse(&payload)?;
                return Ok(QueryResult::ResultSet(ResultSet {
                    columns,
                    rows,
                    warnings: eof.warning_count,
                }));
            }
            let row = ResultSetRowPacket::parse(&payload)?;
            rows.push(Row::new(row.cells, columns.clone()));
        }
    }

    /// Read one logical payload, joining the continuation frames of rows
    /// longer than a single frame.
    fn read_response_payload(&mut self) -> CResult<Vec<u8>> {
        let packet = self.channel.read_packet()?;
        let mut payload = packet.payload;

        let mut last_frame_length = payload.len();
        while last_frame_length == MAX_BODY_LENGTH {
            let next = self.channel.read_packet()?;
            last_frame_length = next.payload.len();
            payload.extend_from_slice(&next.payload);
        }

        Ok(payload)
    }

    /// Stream the file to the server inside the running query exchange,
    /// then read the final response. The sequence counter keeps advancing
    /// across the upload; a zero-length frame marks end of file.
    fn send_local_infile<R: Read>(&mut self, file: R) -> CResult<QueryResult> {
        let mut reader = BufReader::new(file);
        let mut chunk = vec![0u8; MAX_BODY_LENGTH];

        loop {
            let filled = fill_chunk(&mut reader, &mut chunk)?;
            if filled == 0 {
                break;
            }
            debug!("sending local infile chunk of {} bytes", filled);
            self.channel.write_packet(&chunk[..filled])?;
            if filled < chunk.len() {
                break;
            }
        }

        self.channel.write_packet(&[])?;
        self.channel.flush()?;

        let payload = self.read_response_payload()?;
        match parse_response(&payload)? {
            ResponsePacket::Ok(ok) => Ok(QueryResult::from(ok)),
            ResponsePacket::Error(error) => Err(error.into()),
            ResponsePacket::ResultSetHeader(field_count) => self.read_result_set(field_count),
            _ => Err(DriverError::Protocol(
                "unexpected reply to a local infile upload".to_string(),
            )),
        }
    }

    /// COM_PING; Ok(false) when the server answers with an ERR packet.
    #[instrument(skip(self))]
    pub fn ping(&mut self) -> CResult<bool> {
        self.ensure_usable()?;
        let result = self.run_ping();
        self.seal(result)
    }

    fn run_ping(&mut self) -> CResult<bool> {
        let command = PingCommand::new();
        self.channel.write_command(&command.serialize()?)?;

        let payload = self.read_response_payload()?;
        match parse_response(&payload)? {
            ResponsePacket::Ok(_) => Ok(true),
            ResponsePacket::Error(_) => Ok(false),
            _ => Err(DriverError::Protocol(
                "unexpected reply to ping".to_string(),
            )),
        }
    }

    /// COM_INIT_DB.
    #[instrument(skip(self))]
    pub fn select_db(&mut self, database: &str) -> CResult<()> {
        self.ensure_usable()?;
        let result = self.run_select_db(database);
        self.seal(result)
    }

    fn run_select_db(&mut self, database: &str) -> CResult<()> {
        let command = SelectDbCommand::new(database);
        self.channel.write_command(&command.serialize()?)?;

        let payload = self.read_response_payload()?;
        match parse_response(&payload)? {
            ResponsePacket::Ok(_) => {
                self.options.database = Some(database.to_string());
                Ok(())
            }
            ResponsePacket::Error(error) => Err(error.into()),
            _ => Err(DriverError::Protocol(
                "unexpected reply to select db".to_string(),
            )),
        }
    }

    /// Send COM_QUIT (the server does not reply) and tear the socket down.
    /// The connection is single-use; a closed connection is not reopened.
    #[instrument(skip(self))]
    pub fn close(&mut self) -> CResult<()> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;

        if !self.poisoned {
            let command = QuitCommand::new();
            if let Err(err) = self.channel.write_command(&command.serialize()?) {
                warn!("could not send quit command: {}", err);
            }
        }
        if let Err(err) = self.channel.shutdown() {
            warn!("could not shut down socket: {}", err);
        }

        Ok(())
    }

    //////////////////////
    // Transactions
    //////////////////////

    pub fn commit(&mut self) -> CResult<()> {
        self.execute_query("COMMIT").map(|_| ())
    }

    pub fn rollback(&mut self) -> CResult<()> {
        self.execute_query("ROLLBACK").map(|_| ())
    }

    pub fn rollback_to_savepoint(&mut self, savepoint: &str) -> CResult<()> {
        self.execute_query(&format!("ROLLBACK TO SAVEPOINT {}", savepoint))
            .map(|_| ())
    }

    pub fn set_savepoint(&mut self, savepoint: &str) -> CResult<()> {
        self.execute_query(&format!("SAVEPOINT {}", savepoint))
            .map(|_| ())
    }

    pub fn release_savepoint(&mut self, savepoint: &str) -> CResult<()> {
        self.execute_query(&format!("RELEASE SAVEPOINT {}", savepoint))
            .map(|_| ())
    }

    //////////////////////
    // Batch
    //////////////////////

    pub fn add_to_batch<S: Into<String>>(&mut self, sql: S) {
        self.batch.push(sql.into());
    }

    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Run the queued queries in submission order, one result per entry.
    /// The queue is empty afterwards whether or not every query succeeded;
    /// results produced before a failure are discarded with the error.
    #[instrument(skip(self))]
    pub fn execute_batch(&mut self) -> CResult<Vec<QueryResult>> {
        let queries = mem::take(&mut self.batch);
        let mut results = Vec::with_capacity(queries.len());

        for sql in &queries {
            results.push(self.execute_query(sql)?);
        }

        Ok(results)
    }

    //////////////////////
    // Binlog dump
    //////////////////////

    /// Issue COM_BINLOG_DUMP and surface the reply frames verbatim until
    /// the server's EOF packet.
    #[instrument(skip(self))]
    pub fn start_binlog_dump(&mut self, position: u32, filename: &str) -> CResult<BinlogFrames<'_>> {
        self.ensure_usable()?;
        let command = DumpBinlogCommand::new(self.options.server_id, filename, position);
        let sent = self.channel.write_command(&command.serialize()?);
        self.seal(sent)?;
        Ok(BinlogFrames::new(self))
    }

    pub(crate) fn read_raw_frame(&mut self) -> CResult<RawPacket> {
        self.channel.read_packet()
    }

    pub(crate) fn poison(&mut self) {
        self.poisoned = true;
    }

    //////////////////////
    // Accessors
    //////////////////////

    /// Issue `SELECT @@variable` and return the single value.
    pub fn get_server_variable(&mut self, variable: &str) -> CResult<String> {
        let result = self.execute_query(&format!("SELECT @@{}", variable))?;
        match result {
            QueryResult::ResultSet(set) => {
                let row = set.rows.first().ok_or_else(|| {
                    DriverError::ColumnLookup(format!("no value for variable {:?}", variable))
                })?;
                match row.get(0)? {
                    Some(value) => Ok(value.to_string()),
                    None => Err(DriverError::ColumnLookup(format!(
                        "variable {:?} is NULL",
                        variable
                    ))),
                }
            }
            QueryResult::Update(_) => Err(DriverError::Protocol(
                "variable lookup did not produce a result set".to_string(),
            )),
        }
    }

    pub fn host(&self) -> &str {
        &self.options.hostname
    }

    pub fn port(&self) -> u16 {
        self.options.port
    }

    pub fn database(&self) -> Option<&str> {
        self.options.database.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.options.username
    }

    pub fn password(&self) -> &str {
        &self.options.password
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    pub fn server_capabilities(&self) -> Capabilities {
        self.server_capabilities
    }

    pub fn database_type(&self) -> DatabaseFamily {
        DatabaseFamily::from_version(&self.server_version)
    }

    pub fn supports_pbms(&self) -> bool {
        self.config.enable_blob_streaming
    }

    pub fn is_closed(&self) -> bool {
        !self.connected
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    //////////////////////
    // Failure handling
    //////////////////////

    fn ensure_usable(&self) -> CResult<()> {
        if !self.connected {
            return Err(DriverError::Transport(
                "connection is closed".to_string(),
            ));
        }
        if self.poisoned {
            return Err(DriverError::Transport(
                "connection is poisoned by an earlier transport or protocol failure".to_string(),
            ));
        }
        Ok(())
    }

    fn seal<T>(&mut self, result: CResult<T>) -> CResult<T> {
        if let Err(err) = &result {
            if err.poisons() {
                self.poisoned = true;
            }
        }
        result
    }
}

/// Fill `chunk` from the reader, stopping early only at end of input.
fn fill_chunk<R: Read>(reader: &mut R, chunk: &mut [u8]) -> CResult<usize> {
    let mut filled = 0;
    while filled < chunk.len() {
        let n = reader.read(&mut chunk[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
