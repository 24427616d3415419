// ABOUTME: Dump command implementations - snapshot databases to flat files
// ABOUTME: Writes one file per table for one or both configured databases

use crate::config::{Config, DatabaseConfig, Side};
use crate::dump::{dump_database, DumpSummary};
use crate::mysql::MysqlSession;
use crate::policy::IgnorePolicy;
use crate::utils::{ensure_writable_dir, table_progress};
use anyhow::{Context, Result};
use std::path::Path;

/// Snapshot the first database into `dir`.
///
/// The directory is checked before any connection is opened.
pub async fn dump(config: &Config, policy: &IgnorePolicy) -> Result<()> {
    let database = config.require_database(Side::First)?;
    let dir = config.require_dir(Side::First)?;
    ensure_writable_dir(dir)?;

    dump_side(database, dir, policy).await?;
    Ok(())
}

/// Snapshot the first database into `dir` and the second into `dir2`.
///
/// Both directories are checked before either database is contacted.
pub async fn two_dumps(config: &Config, policy: &IgnorePolicy) -> Result<()> {
    let first = config.require_database(Side::First)?;
    let second = config.require_database(Side::Second)?;
    let first_dir = config.require_dir(Side::First)?;
    let second_dir = config.require_dir(Side::Second)?;
    ensure_writable_dir(first_dir)?;
    ensure_writable_dir(second_dir)?;

    dump_side(first, first_dir, policy).await?;
    dump_side(second, second_dir, policy).await?;
    Ok(())
}

async fn dump_side(
    database: &DatabaseConfig,
    dir: &Path,
    policy: &IgnorePolicy,
) -> Result<DumpSummary> {
    tracing::info!("Connecting to {}...", database.display_label());
    let mut session = MysqlSession::open(database)
        .await
        .with_context(|| format!("Failed to connect to {}", database.display_label()))?;

    let progress = table_progress()?;
    let result = dump_database(&mut session, policy, dir, &progress).await;
    progress.finish_and_clear();
    let summary = result?;

    session.close().await?;

    tracing::info!(
        "✓ Dumped {} into {}: {} files, {} rows, {} tables without comparable columns",
        database.display_label(),
        dir.display(),
        summary.files_written,
        summary.rows_written,
        summary.tables_skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_with_dirs(dir: &Path, dir2: &Path) -> Config {
        let mut config = Config::from_yaml(
            "database:\n  host: 127.0.0.1\n  port: 1\n  database: a\n  username: u\n\
             database2:\n  host: 127.0.0.1\n  port: 1\n  database: b\n  username: u\n",
        )
        .unwrap();
        config.dir = Some(dir.to_path_buf());
        config.dir2 = Some(dir2.to_path_buf());
        config
    }

    #[tokio::test]
    async fn test_two_dumps_checks_both_dirs_before_connecting() {
        let good = tempdir().unwrap();
        let missing = good.path().join("missing");
        let config = config_with_dirs(good.path(), &missing);
        let policy = IgnorePolicy::from_config(&config);

        // Port 1 is unreachable, so reaching the database would fail differently
        let err = two_dumps(&config, &policy).await.unwrap_err();
        assert!(err.to_string().contains("error checking dir"));
    }

    #[tokio::test]
    async fn test_dump_requires_dir() {
        let mut config = config_with_dirs(Path::new("/tmp"), Path::new("/tmp"));
        config.dir = None;
        let policy = IgnorePolicy::from_config(&config);

        let err = dump(&config, &policy).await.unwrap_err();
        assert!(err.to_string().contains("'dir'"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_dump_command() {
        let path = std::env::var("TEST_CONFIG").unwrap();
        let mut config = Config::load(Some(Path::new(&path))).unwrap();
        let out = tempdir().unwrap();
        config.dir = Some(out.path().to_path_buf());
        let policy = IgnorePolicy::from_config(&config);

        dump(&config, &policy).await.unwrap();
        assert!(std::fs::read_dir(out.path()).unwrap().count() > 0);
    }
}
