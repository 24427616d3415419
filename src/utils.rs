// ABOUTME: Utility functions shared by the comparison commands
// ABOUTME: Directory checks, external tool lookup and progress bars

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use which::which;

/// Check that `dir` exists and is a directory
///
/// # Examples
///
/// ```
/// # use mysql_db_compare::utils::ensure_dir;
/// assert!(ensure_dir(&std::env::temp_dir()).is_ok());
/// assert!(ensure_dir(std::path::Path::new("/definitely/not/here")).is_err());
/// ```
pub fn ensure_dir(dir: &Path) -> Result<()> {
    let metadata = std::fs::metadata(dir)
        .with_context(|| format!("error checking dir {}", dir.display()))?;

    if !metadata.is_dir() {
        bail!("destination {} is not a directory", dir.display());
    }

    Ok(())
}

/// Check that `dir` is an existing directory that accepts new files.
///
/// Writability is probed by creating a temporary file, which is removed
/// again before returning.
pub fn ensure_writable_dir(dir: &Path) -> Result<()> {
    ensure_dir(dir)?;

    tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("dir {} has no write permissions", dir.display()))?;

    Ok(())
}

/// Check that an external tool can be executed
///
/// Commands given as a path (containing a separator) must exist as a file;
/// bare names are looked up on `PATH`.
///
/// # Errors
///
/// Returns an error naming the tool when it cannot be found.
pub fn check_tool(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        bail!("No diff command configured");
    }

    if command.contains(std::path::MAIN_SEPARATOR) || command.contains('/') {
        if !Path::new(command).is_file() {
            bail!(
                "Diff tool not found: {}\n\
                 Set 'diff_command' in the configuration to the tool's location.",
                command
            );
        }
        return Ok(());
    }

    if which(command).is_err() {
        bail!(
            "Diff tool '{}' is not installed or not in PATH.\n\
             Install it or set 'diff_command' in the configuration.",
            command
        );
    }

    Ok(())
}

/// Progress bar over a table catalog; length is set once the catalog is known
pub fn table_progress() -> Result<ProgressBar> {
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("##-"),
    );
    Ok(progress)
}
