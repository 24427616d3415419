// ABOUTME: YAML configuration for comparison runs
// ABOUTME: Database endpoints, dump directories, ignore lists and diff options

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// External diff tool used by the `diff` strategy unless overridden
pub const DEFAULT_DIFF_COMMAND: &str = "./Ndiff.sh";

/// Everything a comparison run needs, as read from the YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "database")]
    pub database1: Option<DatabaseConfig>,
    pub database2: Option<DatabaseConfig>,
    pub dir: Option<PathBuf>,
    pub dir2: Option<PathBuf>,
    #[serde(default)]
    pub ignore_tables: Vec<String>,
    #[serde(default)]
    pub ignore_columns: Vec<String>,
    #[serde(default)]
    pub ignore_table_columns: Vec<TableColumns>,
    #[serde(default)]
    pub ignore_types: Vec<String>,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub detailed: bool,
    #[serde(default = "default_diff_command")]
    pub diff_command: String,
}

/// Connection details and display label for one side of a comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub label: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Columns ignored for one specific table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableColumns {
    pub table_name: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Which of the two configured entries a strategy is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl Side {
    fn database_key(self) -> &'static str {
        match self {
            Side::First => "database",
            Side::Second => "database2",
        }
    }

    fn dir_key(self) -> &'static str {
        match self {
            Side::First => "dir",
            Side::Second => "dir2",
        }
    }
}

fn default_port() -> u16 {
    3306
}

fn default_diff_command() -> String {
    DEFAULT_DIFF_COMMAND.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database1: None,
            database2: None,
            dir: None,
            dir2: None,
            ignore_tables: Vec::new(),
            ignore_columns: Vec::new(),
            ignore_table_columns: Vec::new(),
            ignore_types: Vec::new(),
            limit: 0,
            detailed: false,
            diff_command: default_diff_command(),
        }
    }
}

impl Config {
    /// Load the configuration file, falling back to [`DEFAULT_CONFIG_FILE`]
    /// when `path` is `None` or empty.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new(DEFAULT_CONFIG_FILE),
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file \"{}\"", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("parsing config file \"{}\"", path.display()))
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).context("unmarshaling config")?;
        Ok(config)
    }

    /// The database entry for `side`, or a configuration error naming the missing key
    pub fn require_database(&self, side: Side) -> Result<&DatabaseConfig> {
        let database = match side {
            Side::First => self.database1.as_ref(),
            Side::Second => self.database2.as_ref(),
        };
        database.with_context(|| {
            format!(
                "configuration is missing the '{}' section",
                side.database_key()
            )
        })
    }

    /// The dump directory for `side`, or a configuration error naming the missing key
    pub fn require_dir(&self, side: Side) -> Result<&Path> {
        let dir = match side {
            Side::First => self.dir.as_deref(),
            Side::Second => self.dir2.as_deref(),
        };
        dir.filter(|d| !d.as_os_str().is_empty())
            .with_context(|| format!("configuration is missing '{}'", side.dir_key()))
    }
}

impl DatabaseConfig {
    /// Label used in reports; the database name when no label is configured
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.database
        } else {
            &self.label
        }
    }
}
