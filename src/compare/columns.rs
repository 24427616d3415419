// ABOUTME: Column selection for data comparison and dumps
// ABOUTME: Intersects a table's columns with the ignore policy and builds the projection query

use crate::mysql::Session;
use crate::policy::IgnorePolicy;
use anyhow::{Context, Result};

pub const TABLE_COLUMNS_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_NAME = ? AND TABLE_SCHEMA = ? \
     ORDER BY ORDINAL_POSITION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

/// The ordered, non-empty set of columns compared for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub table: String,
    pub columns: Vec<Column>,
}

impl Projection {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `SELECT` over exactly the projected columns, identifiers quoted
    pub fn select_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect();
        format!(
            "SELECT {} FROM {}",
            columns.join(", "),
            quote_identifier(&self.table)
        )
    }
}

/// Backtick-quote a MySQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Determine which columns of `table` take part in comparison.
///
/// Returns `Ok(None)` when every column is ignored: the table has no
/// comparable data, which callers skip rather than treat as a failure.
pub async fn select_columns<S>(
    session: &mut S,
    policy: &IgnorePolicy,
    table: &str,
) -> Result<Option<Projection>>
where
    S: Session + ?Sized,
{
    let database = session.database().to_string();
    let rows = session
        .query(TABLE_COLUMNS_SQL, &[table, database.as_str()])
        .await
        .with_context(|| {
            format!(
                "Failed to get columns for {} on '{}'",
                table,
                session.label()
            )
        })?;

    let columns: Vec<Column> = rows
        .into_iter()
        .filter_map(|row| {
            let mut cells = row.into_iter();
            match (cells.next(), cells.next()) {
                (Some(Some(name)), Some(Some(data_type))) => Some(Column { name, data_type }),
                _ => None,
            }
        })
        .filter(|c| {
            !policy.is_column_ignored(table, &c.name) && !policy.is_type_ignored(&c.data_type)
        })
        .collect();

    if columns.is_empty() {
        return Ok(None);
    }

    Ok(Some(Projection {
        table: table.to_string(),
        columns,
    }))
}
