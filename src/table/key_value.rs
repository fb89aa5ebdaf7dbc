//! Two-column tables built from a mapping.

use crate::column::{ColumnSpec, Columns};
use crate::value::{Record, Value};
use crate::Result;

use super::{Table, TableOptions};

pub const KEY_COLUMN: &str = "key";
pub const VAL_COLUMN: &str = "val";

/// One `{key, val}` record per entry, in iteration order.
pub fn records<I, K, V>(entries: I) -> Vec<Record>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Value>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(k, v)| Record::new().with(KEY_COLUMN, k).with(VAL_COLUMN, v))
        .collect()
}

/// Build a [`Table`] with a key column and a value column.
///
/// `key` and `val` carry everything but the column names, which are always
/// [`KEY_COLUMN`] and [`VAL_COLUMN`].
pub fn key_value_table<I, K, V>(
    entries: I,
    key: ColumnSpec,
    val: ColumnSpec,
    options: TableOptions,
) -> Result<Table>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Value>,
    V: Into<Value>,
{
    let columns = Columns::new([
        ColumnSpec {
            key: KEY_COLUMN.to_string(),
            ..key
        },
        ColumnSpec {
            key: VAL_COLUMN.to_string(),
            ..val
        },
    ])?;
    Table::new(records(entries), columns, options)
}
