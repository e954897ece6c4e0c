//! Record trait - maps a Rust struct onto one table row

use crate::schema::TableDef;
use rusqlite::types::Value;

/// Name of the surrogate key column every record table carries
pub const ID_COLUMN: &str = "id";

/// A struct stored as one row of a table.
///
/// Every record table has an integer `id` surrogate key assigned by storage
/// on insert. All other columns are provided through [`Record::values`].
pub trait Record: Sized {
    /// Table name
    const TABLE: &'static str;

    /// Full table definition, columns in row order
    fn table() -> TableDef;

    /// Surrogate key, `None` until the record has been added to a session
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// Non-key column values, by column name
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Build a record from a row selected in table column order
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;

    /// Value of a single column, including the surrogate key
    fn value_of(&self, column: &str) -> Option<Value> {
        if column == ID_COLUMN {
            return self.id().map(Value::Integer);
        }
        self.values()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}
