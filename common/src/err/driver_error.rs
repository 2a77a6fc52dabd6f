use std::fmt::Display;
use std::string::FromUtf8Error;
use std::{fmt, io};

/// SQLSTATE class for connection exceptions.
pub const SQL_STATE_CONNECTION_EXCEPTION: &str = "08000";

#[derive(Debug)]
pub enum DriverError {
    //////////////////////
    // Transport
    //////////////////////
    /// Socket open/read/write/close failure described in plain text.
    Transport(String),
    /// Socket failure carrying the underlying io error.
    Io(io::Error),
    /// The handshake failed before the connection became usable.
    Connection(String),

    //////////////////////
    // Server
    //////////////////////
    /// The server answered a command with an ERR packet.
    Query {
        message: String,
        error_number: u16,
        sql_state: String,
    },

    //////////////////////
    // Protocol
    //////////////////////
    /// Unexpected packet type, malformed length or bad sequence number.
    Protocol(String),
    /// Transport failure while a binlog dump stream was in flight.
    BinlogDump(String),

    //////////////////////
    // Result sets
    //////////////////////
    /// A requested column or cell is not present in the result set.
    ColumnLookup(String),

    FromUtf8(FromUtf8Error),
}

impl DriverError {
    /// Whether the connection that observed this error must stop issuing
    /// commands. Query and column-lookup failures leave the exchange
    /// aligned; everything else does not.
    pub fn poisons(&self) -> bool {
        match self {
            DriverError::Query { .. } | DriverError::ColumnLookup(_) => false,
            _ => true,
        }
    }

    pub fn sql_state(&self) -> &str {
        match self {
            DriverError::Query { sql_state, .. } => sql_state,
            _ => SQL_STATE_CONNECTION_EXCEPTION,
        }
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> fmt::Result {
        match self {
            DriverError::Transport(s)
            | DriverError::Connection(s)
            | DriverError::Protocol(s)
            | DriverError::BinlogDump(s)
            | DriverError::ColumnLookup(s) => {
                write!(f, "{}", s)
            }
            DriverError::Query {
                message,
                error_number,
                sql_state,
            } => {
                write!(f, "{} (error {}, sqlstate {})", message, error_number, sql_state)
            }
            DriverError::Io(err) => {
                write!(f, "{}", err)
            }
            DriverError::FromUtf8(err) => {
                write!(f, "{}", err)
            }
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Io(err) => Some(err),
            DriverError::FromUtf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DriverError {
    fn from(error: io::Error) -> Self {
        DriverError::Io(error)
    }
}

impl From<FromUtf8Error> for DriverError {
    fn from(error: FromUtf8Error) -> Self {
        DriverError::FromUtf8(error)
    }
}
