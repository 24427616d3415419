// ABOUTME: Diff command implementation - compare two dump directories
// ABOUTME: Runs the external diff tool over dir and dir2 and relays its output

use crate::config::{Config, Side};
use crate::utils::{check_tool, ensure_dir};
use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::process::Command;

/// Arguments for the diff tool: `-l <limit> -D <dir> -D <dir2> [-d]`
pub fn diff_args(config: &Config) -> Result<Vec<OsString>> {
    let mut args: Vec<OsString> = vec![
        "-l".into(),
        config.limit.to_string().into(),
        "-D".into(),
        config.require_dir(Side::First)?.into(),
        "-D".into(),
        config.require_dir(Side::Second)?.into(),
    ];
    if config.detailed {
        args.push("-d".into());
    }
    Ok(args)
}

/// Run the diff tool and return its standard output unchanged.
///
/// No database is contacted; both directories are expected to hold dumps,
/// possibly written by earlier runs.
pub fn run_diff(config: &Config) -> Result<String> {
    ensure_dir(config.require_dir(Side::First)?)?;
    ensure_dir(config.require_dir(Side::Second)?)?;
    check_tool(&config.diff_command)?;

    let args = diff_args(config)?;
    tracing::debug!("Running {} {:?}", config.diff_command, args);

    let output = Command::new(&config.diff_command)
        .args(&args)
        .output()
        .with_context(|| format!("Failed to execute {}", config.diff_command))?;

    if !output.status.success() {
        // Whatever the tool printed before failing is still worth showing
        print!("{}", String::from_utf8_lossy(&output.stdout));
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "{} failed ({}): {}",
            config.diff_command,
            output.status,
            stderr.trim_end()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run the diff tool and print its output verbatim
pub async fn diff(config: &Config) -> Result<()> {
    tracing::info!("Comparing dump directories...");
    let output = run_diff(config)?;
    print!("{}", output);
    Ok(())
}
