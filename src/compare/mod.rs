// ABOUTME: Comparison engine for two database snapshots
// ABOUTME: Pairs catalogs, then checks schema and data table by table

pub mod catalog;
pub mod columns;
pub mod data;
pub mod schema;

pub use catalog::{ensure_catalogs_match, list_tables, TableDescriptor, TableKind};
pub use columns::{quote_identifier, select_columns, Column, Projection};
pub use data::{compare_rows, fetch_rows, serialize_row, table_data, DELIMITER, NULL_MARKER};
pub use schema::{compare_schema, fetch_definition, normalize_definition};

use crate::error::CompareError;
use crate::mysql::Session;
use crate::policy::IgnorePolicy;
use anyhow::{Context, Result};
use indicatif::ProgressBar;

/// What a successful live comparison covered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub tables_compared: usize,
    /// Tables whose data was skipped because no column is comparable
    pub tables_without_columns: usize,
    pub rows_compared: usize,
}

/// Compare every table of two sessions, stopping at the first difference.
///
/// Catalogs must pair up before any table is touched. Each table's schema
/// is checked before its data, both read through the sessions' snapshots.
pub async fn compare_databases<L, R>(
    left: &mut L,
    right: &mut R,
    policy: &IgnorePolicy,
    progress: &ProgressBar,
) -> Result<ComparisonSummary>
where
    L: Session + ?Sized,
    R: Session + ?Sized,
{
    let left_tables = list_tables(left, policy).await?;
    let right_tables = list_tables(right, policy).await?;

    ensure_catalogs_match(&left_tables, left.label(), &right_tables, right.label())?;
    tracing::info!("Found {} tables to compare", left_tables.len());

    progress.set_length(left_tables.len() as u64);
    let mut summary = ComparisonSummary::default();

    for table in &left_tables {
        progress.set_message(table.name.clone());

        compare_schema(left, right, table)
            .await
            .context("schema error")?;

        match compare_table_data(left, right, policy, &table.name)
            .await
            .context("data error")?
        {
            Some(rows) => summary.rows_compared += rows,
            None => summary.tables_without_columns += 1,
        }

        summary.tables_compared += 1;
        progress.inc(1);
    }

    Ok(summary)
}

/// Compare the data of one table; `Ok(None)` when it has no comparable columns.
pub async fn compare_table_data<L, R>(
    left: &mut L,
    right: &mut R,
    policy: &IgnorePolicy,
    table: &str,
) -> Result<Option<usize>>
where
    L: Session + ?Sized,
    R: Session + ?Sized,
{
    // Both projections are settled before any row is read
    let left_projection = select_columns(left, policy, table).await?;
    let right_projection = select_columns(right, policy, table).await?;

    let projection = match (left_projection, right_projection) {
        (None, None) => {
            tracing::info!("Skipping data of {}: no comparable columns", table);
            return Ok(None);
        }
        (Some(projection), Some(_)) => projection,
        (Some(_), None) => {
            return Err(CompareError::ProjectionMismatch {
                table: table.to_string(),
                with_columns: left.label().to_string(),
                without_columns: right.label().to_string(),
            }
            .into())
        }
        (None, Some(_)) => {
            return Err(CompareError::ProjectionMismatch {
                table: table.to_string(),
                with_columns: right.label().to_string(),
                without_columns: left.label().to_string(),
            }
            .into())
        }
    };

    let left_rows = fetch_rows(left, &projection).await?;
    let right_rows = fetch_rows(right, &projection).await?;

    compare_rows(
        &projection,
        left.label(),
        &left_rows,
        right.label(),
        &right_rows,
    )?;

    tracing::debug!("Data of {} matches ({} rows)", table, left_rows.len());
    Ok(Some(left_rows.len()))
}
