// ABOUTME: Flat-file snapshots of a database for later directory diffing
// ABOUTME: One file per table with a header and the canonical sorted rows

use crate::compare::{list_tables, table_data, Projection, DELIMITER};
use crate::mysql::Session;
use crate::policy::IgnorePolicy;
use crate::utils::ensure_writable_dir;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extension of every dump file
pub const DUMP_EXTENSION: &str = "Ncsv";

/// What a dump run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub files_written: usize,
    /// Tables without comparable columns, for which no file is created
    pub tables_skipped: usize,
    pub rows_written: usize,
}

/// `<dir>/<table>.Ncsv`
pub fn dump_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{}.{}", table, DUMP_EXTENSION))
}

/// Write the header and rows of one table, returning the file path.
pub fn write_table_dump(dir: &Path, projection: &Projection, rows: &[String]) -> Result<PathBuf> {
    let path = dump_path(dir, &projection.table);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create dump file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let write_all = |writer: &mut BufWriter<File>| -> std::io::Result<()> {
        writeln!(writer, "{}", projection.column_names().join(DELIMITER))?;
        for row in rows {
            writeln!(writer, "{}", row)?;
        }
        writer.flush()
    };
    write_all(&mut writer)
        .with_context(|| format!("Failed to write dump file {}", path.display()))?;

    Ok(path)
}

/// Write one dump file per comparable table of `session` into `dir`.
pub async fn dump_database<S>(
    session: &mut S,
    policy: &IgnorePolicy,
    dir: &Path,
    progress: &ProgressBar,
) -> Result<DumpSummary>
where
    S: Session + ?Sized,
{
    ensure_writable_dir(dir)?;

    let tables = list_tables(session, policy).await?;
    tracing::info!(
        "Dumping {} tables from '{}' into {}",
        tables.len(),
        session.label(),
        dir.display()
    );

    progress.set_length(tables.len() as u64);
    let mut summary = DumpSummary::default();

    for table in &tables {
        progress.set_message(table.name.clone());

        match table_data(session, policy, &table.name).await? {
            Some((projection, rows)) => {
                let path = write_table_dump(dir, &projection, &rows)?;
                tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());
                summary.files_written += 1;
                summary.rows_written += rows.len();
            }
            None => {
                tracing::info!("Skipping {}: no comparable columns", table.name);
                summary.tables_skipped += 1;
            }
        }

        progress.inc(1);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::catalog::LIST_TABLES_SQL;
    use crate::compare::columns::TABLE_COLUMNS_SQL;
    use crate::compare::Column;
    use crate::config::Config;
    use crate::testing::{row, FakeSession};
    use tempfile::tempdir;

    fn projection() -> Projection {
        Projection {
            table: "users".to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: "int".to_string(),
                },
                Column {
                    name: "email".to_string(),
                    data_type: "varchar".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_write_table_dump_header_and_rows() {
        let dir = tempdir().unwrap();
        let rows = vec!["1,nil".to_string(), "2,".to_string()];

        let path = write_table_dump(dir.path(), &projection(), &rows).unwrap();

        assert_eq!(path, dir.path().join("users.Ncsv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,email\n1,nil\n2,\n");
    }

    #[test]
    fn test_header_written_for_empty_table() {
        let dir = tempdir().unwrap();
        let path = write_table_dump(dir.path(), &projection(), &[]).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "id,email\n");
    }

    #[tokio::test]
    async fn test_dump_database_skips_tables_without_columns() {
        let config = Config {
            ignore_table_columns: vec![crate::config::TableColumns {
                table_name: "tokens".to_string(),
                columns: vec!["value".to_string()],
            }],
            ..Config::default()
        };
        let policy = IgnorePolicy::from_config(&config);

        let mut session = FakeSession::new("prod", "shop");
        session
            .expect(
                LIST_TABLES_SQL,
                vec![
                    row(&[Some("users"), Some("BASE TABLE")]),
                    row(&[Some("tokens"), Some("BASE TABLE")]),
                ],
            )
            .expect(
                TABLE_COLUMNS_SQL,
                vec![
                    row(&[Some("id"), Some("int")]),
                    row(&[Some("email"), Some("varchar")]),
                ],
            )
            .expect(
                "SELECT `id`, `email` FROM `users`",
                vec![
                    row(&[Some("2"), Some("b@x")]),
                    row(&[Some("1"), None]),
                ],
            )
            .expect(TABLE_COLUMNS_SQL, vec![row(&[Some("value"), Some("text")])]);

        let dir = tempdir().unwrap();
        let summary = dump_database(&mut session, &policy, dir.path(), &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(
            summary,
            DumpSummary {
                files_written: 1,
                tables_skipped: 1,
                rows_written: 2,
            }
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("users.Ncsv")).unwrap(),
            "id,email\n1,nil\n2,b@x\n"
        );
        assert!(!dir.path().join("tokens.Ncsv").exists());
    }

    #[tokio::test]
    async fn test_dump_database_checks_dir_before_querying() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let mut session = FakeSession::new("prod", "shop");

        let result = dump_database(
            &mut session,
            &IgnorePolicy::default(),
            &missing,
            &ProgressBar::hidden(),
        )
        .await;

        assert!(result.is_err());
        assert!(session.executed.is_empty());
    }
}
