// ABOUTME: Schema definition capture and comparison
// ABOUTME: Strips environment noise such as AUTO_INCREMENT counters before comparing

use super::catalog::{TableDescriptor, TableKind};
use super::columns::quote_identifier;
use crate::error::CompareError;
use crate::mysql::Session;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static AUTO_INCREMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AUTO_INCREMENT=\S+ ").expect("AUTO_INCREMENT pattern is valid"));

/// Remove `AUTO_INCREMENT=<value> ` (trailing space included) from a definition.
///
/// The match is case-sensitive; text without the exact pattern is returned as is.
pub fn normalize_definition(definition: &str) -> Cow<'_, str> {
    AUTO_INCREMENT.replace_all(definition, "")
}

pub fn show_create_sql(table: &str) -> String {
    format!("SHOW CREATE TABLE {}", quote_identifier(table))
}

/// Fetch the definition text of `table` from the server.
///
/// Views answer with four fields and base tables with two; the statement
/// is the second field in both shapes.
pub async fn fetch_definition<S>(session: &mut S, table: &TableDescriptor) -> Result<Option<String>>
where
    S: Session + ?Sized,
{
    let rows = session
        .query(&show_create_sql(&table.name), &[])
        .await
        .with_context(|| {
            format!(
                "Failed to get definition of {} on '{}'",
                table.name,
                session.label()
            )
        })?;

    let expected_fields = match table.kind {
        TableKind::View => 4,
        TableKind::BaseTable => 2,
    };

    let Some(row) = rows.into_iter().next() else {
        bail!(
            "no definition returned for {} on '{}'",
            table.name,
            session.label()
        );
    };
    if row.len() != expected_fields {
        bail!(
            "unexpected definition shape for {} ({}) on '{}': {} fields, expected {}",
            table.name,
            table.kind,
            session.label(),
            row.len(),
            expected_fields
        );
    }

    Ok(row.into_iter().nth(1).flatten())
}

/// Compare the normalized definition of one table on both sides.
pub async fn compare_schema<L, R>(left: &mut L, right: &mut R, table: &TableDescriptor) -> Result<()>
where
    L: Session + ?Sized,
    R: Session + ?Sized,
{
    let left_definition = fetch_definition(left, table).await?;
    let right_definition = fetch_definition(right, table).await?;

    let left_normalized = left_definition.as_deref().map(normalize_definition);
    let right_normalized = right_definition.as_deref().map(normalize_definition);

    if left_normalized != right_normalized {
        return Err(CompareError::SchemaMismatch {
            table: table.name.clone(),
        }
        .into());
    }

    tracing::debug!("Schema of {} matches", table.name);
    Ok(())
}
