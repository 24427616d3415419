// ABOUTME: Row serialization and row-set comparison
// ABOUTME: Canonical sorted rows, compared pairwise to localize the first differing field

use super::columns::{select_columns, Projection};
use crate::error::CompareError;
use crate::mysql::Session;
use crate::policy::IgnorePolicy;
use anyhow::{Context, Result};

/// Written in place of SQL NULL
pub const NULL_MARKER: &str = "nil";

/// Separates fields of a serialized row. Values are not escaped.
pub const DELIMITER: &str = ",";

/// Join a row's cells with [`DELIMITER`], NULLs as [`NULL_MARKER`]
pub fn serialize_row(cells: &[Option<String>]) -> String {
    cells
        .iter()
        .map(|cell| cell.as_deref().unwrap_or(NULL_MARKER))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Fetch every row of the projection, serialized and sorted ascending.
pub async fn fetch_rows<S>(session: &mut S, projection: &Projection) -> Result<Vec<String>>
where
    S: Session + ?Sized,
{
    let rows = session
        .query(&projection.select_sql(), &[])
        .await
        .with_context(|| {
            format!(
                "Failed to read data of {} on '{}'",
                projection.table,
                session.label()
            )
        })?;

    let mut serialized: Vec<String> = rows.iter().map(|row| serialize_row(row)).collect();
    serialized.sort();
    Ok(serialized)
}

/// Select the comparable columns of `table` and fetch its sorted rows.
///
/// `Ok(None)` means the table has no comparable columns on this side.
pub async fn table_data<S>(
    session: &mut S,
    policy: &IgnorePolicy,
    table: &str,
) -> Result<Option<(Projection, Vec<String>)>>
where
    S: Session + ?Sized,
{
    let Some(projection) = select_columns(session, policy, table).await? else {
        return Ok(None);
    };
    let rows = fetch_rows(session, &projection).await?;
    Ok(Some((projection, rows)))
}

/// Compare two sorted row sets and report the first difference.
///
/// Row counts are checked before any row. Within the first differing row
/// the first differing field is reported, with the column name taken from
/// `projection` and a 1-based row index.
pub fn compare_rows(
    projection: &Projection,
    left_label: &str,
    left: &[String],
    right_label: &str,
    right: &[String],
) -> std::result::Result<(), CompareError> {
    if left.len() != right.len() {
        return Err(CompareError::RowCountMismatch {
            table: projection.table.clone(),
            left_label: left_label.to_string(),
            left: left.len(),
            right_label: right_label.to_string(),
            right: right.len(),
        });
    }

    for (index, (left_row, right_row)) in left.iter().zip(right).enumerate() {
        if left_row == right_row {
            continue;
        }

        let left_fields: Vec<&str> = left_row.split(DELIMITER).collect();
        let right_fields: Vec<&str> = right_row.split(DELIMITER).collect();

        // A value containing the delimiter can make the field counts differ;
        // a missing field then counts as the difference
        let field_count = left_fields.len().max(right_fields.len());
        let Some(field) =
            (0..field_count).find(|&i| left_fields.get(i) != right_fields.get(i))
        else {
            continue;
        };

        let column = projection
            .columns
            .get(field)
            .map_or_else(|| format!("#{}", field + 1), |c| c.name.clone());

        return Err(CompareError::ValueMismatch {
            table: projection.table.clone(),
            column,
            row: index + 1,
            left_label: left_label.to_string(),
            left: left_fields.get(field).copied().unwrap_or_default().to_string(),
            right_label: right_label.to_string(),
            right: right_fields.get(field).copied().unwrap_or_default().to_string(),
        });
    }

    Ok(())
}
