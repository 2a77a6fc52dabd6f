use std::sync::Arc;

use common::err::driver_error::DriverError;
use common::err::CResult;

use crate::packet::ok_packet::OkPacket;
use crate::packet::result_set_column_packet::ResultSetColumnPacket;

/// Outcome of one textual query: either the update counters of an OK
/// packet or a fully read result set.
#[derive(Debug)]
pub enum QueryResult {
    Update(UpdateResult),
    ResultSet(ResultSet),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub affected_rows: u64,
    pub warnings: u16,
    pub message: String,
    pub insert_id: u64,
}

impl From<OkPacket> for QueryResult {
    fn from(packet: OkPacket) -> Self {
        QueryResult::Update(UpdateResult {
            affected_rows: packet.affected_rows,
            warnings: packet.warnings,
            message: packet.info,
            insert_id: packet.last_insert_id,
        })
    }
}

#[derive(Debug)]
pub struct ResultSet {
    pub columns: Arc<[ColumnInformation]>,
    pub rows: Vec<Row>,
    pub warnings: u16,
}

/// Column metadata, built once per result set from the definition packet
/// and shared by reference with every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInformation {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub character_set: u16,
    pub column_length: u32,
    /// Wire type code of the column.
    pub column_type: u8,
    pub flags: u16,
    pub decimals: u8,
}

impl From<ResultSetColumnPacket> for ColumnInformation {
    fn from(packet: ResultSetColumnPacket) -> Self {
        ColumnInformation {
            schema: packet.schema,
            table: packet.table,
            name: packet.name,
            character_set: packet.character_set,
            column_length: packet.column_length,
            column_type: packet.column_type,
            flags: packet.flags,
            decimals: packet.decimals,
        }
    }
}

/// One row of a result set: the raw textual cell values plus the shared
/// column metadata.
#[derive(Debug, Clone)]
pub struct Row {
    cells: Vec<Option<String>>,
    columns: Arc<[ColumnInformation]>,
}

impl Row {
    pub(crate) fn new(cells: Vec<Option<String>>, columns: Arc<[ColumnInformation]>) -> Self {
        Row { cells, columns }
    }

    pub fn columns(&self) -> &Arc<[ColumnInformation]> {
        &self.columns
    }

    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The raw value of the cell at `index`, `None` for SQL NULL.
    pub fn get(&self, index: usize) -> CResult<Option<&str>> {
        if index >= self.columns.len() {
            return Err(DriverError::ColumnLookup(format!(
                "no column at index {} in a result set of {} columns",
                index,
                self.columns.len()
            )));
        }
        Ok(self
            .cells
            .get(index)
            .and_then(|cell| cell.as_deref()))
    }

    /// The raw value of the named column.
    pub fn get_by_name(&self, name: &str) -> CResult<Option<&str>> {
        let index = self
            .columns
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| {
                DriverError::ColumnLookup(format!("no column named {:?} in the result set", name))
            })?;
        self.get(index)
    }
}
