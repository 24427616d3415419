// ABOUTME: Table catalog enumeration for comparison runs
// ABOUTME: Lists base tables and views not excluded by the ignore policy

use crate::error::CompareError;
use crate::mysql::Session;
use crate::policy::IgnorePolicy;
use anyhow::{Context, Result};
use std::fmt;

pub const LIST_TABLES_SQL: &str = "SHOW FULL TABLES";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    BaseTable,
    View,
}

impl TableKind {
    /// Map the `Table_type` column of `SHOW FULL TABLES`.
    ///
    /// Anything that is not a view is shown with the two-column
    /// `SHOW CREATE TABLE` shape, so it is treated as a base table.
    pub fn from_table_type(table_type: &str) -> Self {
        match table_type {
            "VIEW" | "SYSTEM VIEW" => TableKind::View,
            _ => TableKind::BaseTable,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::BaseTable => write!(f, "BASE TABLE"),
            TableKind::View => write!(f, "VIEW"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub kind: TableKind,
}

impl fmt::Display for TableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// List every table and view in catalog order, minus ignored tables.
///
/// Rows with a NULL name or type are skipped.
pub async fn list_tables<S>(session: &mut S, policy: &IgnorePolicy) -> Result<Vec<TableDescriptor>>
where
    S: Session + ?Sized,
{
    let rows = session
        .query(LIST_TABLES_SQL, &[])
        .await
        .with_context(|| format!("Failed to list tables on '{}'", session.label()))?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = row.into_iter();
        let (Some(Some(name)), Some(Some(table_type))) = (cells.next(), cells.next()) else {
            continue;
        };

        if policy.is_table_ignored(&name) {
            tracing::debug!("Ignoring table {}", name);
            continue;
        }

        tables.push(TableDescriptor {
            name,
            kind: TableKind::from_table_type(&table_type),
        });
    }

    tracing::debug!("Found {} tables on '{}'", tables.len(), session.label());
    Ok(tables)
}

/// Check two catalogs pair up: same length, then same name and kind at every position.
pub fn ensure_catalogs_match(
    left: &[TableDescriptor],
    left_label: &str,
    right: &[TableDescriptor],
    right_label: &str,
) -> std::result::Result<(), CompareError> {
    if left.len() != right.len() {
        return Err(CompareError::TableCountMismatch {
            left_label: left_label.to_string(),
            left: left.len(),
            right_label: right_label.to_string(),
            right: right.len(),
        });
    }

    match left.iter().zip(right).position(|(l, r)| l != r) {
        Some(position) => Err(CompareError::TableMismatch {
            position: position + 1,
            left_label: left_label.to_string(),
            left: left[position].to_string(),
            right_label: right_label.to_string(),
            right: right[position].to_string(),
        }),
        None => Ok(()),
    }
}
