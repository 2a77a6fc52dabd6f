//! Server status bits, received in the greeting and refreshed by every
//! OK/EOF packet.

/// A multi-statement transaction has been started.
pub const SERVER_STATUS_IN_TRANS: u16 = 0x0001;

/// Server in auto_commit mode.
pub const SERVER_STATUS_AUTOCOMMIT: u16 = 0x0002;

/// Multi query - next query exists.
pub const SERVER_MORE_RESULTS_EXISTS: u16 = 0x0008;

pub const SERVER_STATUS_NO_GOOD_INDEX_USED: u16 = 0x0010;

pub const SERVER_STATUS_NO_INDEX_USED: u16 = 0x0020;

/// A read-only non-scrollable cursor was opened for the query.
pub const SERVER_STATUS_CURSOR_EXISTS: u16 = 0x0040;

/// A read-only cursor is exhausted.
pub const SERVER_STATUS_LAST_ROW_SENT: u16 = 0x0080;

/// A database was dropped.
pub const SERVER_STATUS_DB_DROPPED: u16 = 0x0100;

pub const SERVER_STATUS_NO_BACKSLASH_ESCAPES: u16 = 0x0200;

/// A reprepared statement now returns a different number of columns.
pub const SERVER_STATUS_METADATA_CHANGED: u16 = 0x0400;

pub const SERVER_QUERY_WAS_SLOW: u16 = 0x0800;

/// Marks a result set carrying output parameter values.
pub const SERVER_PS_OUT_PARAMS: u16 = 0x1000;

/// Set together with SERVER_STATUS_IN_TRANS for read-only transactions.
pub const SERVER_STATUS_IN_TRANS_READONLY: u16 = 0x2000;

/// State information changed because of the last statement.
pub const SERVER_SESSION_STATE_CHANGED: u16 = 0x4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags {
    status_flags: u16,
}

impl StatusFlags {
    pub fn new(status_flags: u16) -> Self {
        StatusFlags { status_flags }
    }

    pub fn empty() -> Self {
        StatusFlags::new(0)
    }

    pub fn bits(&self) -> u16 {
        self.status_flags
    }

    pub fn contains(&self, status_flag: u16) -> bool {
        (self.status_flags & status_flag) != 0
    }
}
