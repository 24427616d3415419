// ABOUTME: Error taxonomy for database comparison failures
// ABOUTME: Catalog, schema and data mismatches that stop a run

use thiserror::Error;

/// A discrepancy (or invalid request) that ends a comparison run.
///
/// Transport failures (connection, query, filesystem) travel as plain
/// `anyhow` errors; these variants are the findings a caller may want to
/// match on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    /// The strategy token is not one of the known modes
    #[error("strategy not valid: '{0}' (expected one of: dump, twodumps, live, diff)")]
    InvalidStrategy(String),

    /// The two catalogs list a different number of tables
    #[error("number of tables doesn't match. {left_label} -> {left}, {right_label} -> {right}")]
    TableCountMismatch {
        left_label: String,
        left: usize,
        right_label: String,
        right: usize,
    },

    /// Tables at the same catalog position differ by name or kind
    #[error("table names don't match at position {position}. {left_label} -> {left}, {right_label} -> {right}")]
    TableMismatch {
        position: usize,
        left_label: String,
        left: String,
        right_label: String,
        right: String,
    },

    /// The normalized definitions of a table differ
    #[error("table {table} schemas don't match")]
    SchemaMismatch { table: String },

    /// One side has comparable columns for a table, the other has none
    #[error("table {table} has comparable columns in {with_columns} but none in {without_columns}")]
    ProjectionMismatch {
        table: String,
        with_columns: String,
        without_columns: String,
    },

    /// Row counts differ for a table
    #[error("number of rows in table {table} doesn't match. {left_label} -> {left}, {right_label} -> {right}")]
    RowCountMismatch {
        table: String,
        left_label: String,
        left: usize,
        right_label: String,
        right: usize,
    },

    /// First differing field after canonical sorting
    #[error(
        "the value from table {table} in column {column} on row {row} is not the same\n\t{left_label}:\t'{left}'\n\t{right_label}:\t'{right}'"
    )]
    ValueMismatch {
        table: String,
        column: String,
        row: usize,
        left_label: String,
        left: String,
        right_label: String,
        right: String,
    },
}
