// ABOUTME: Ignore policy deciding which tables, columns and types are compared
// ABOUTME: Built once from configuration and queried read-only during a run

use crate::config::Config;
use std::collections::{HashMap, HashSet};

/// Lookup tables for everything excluded from comparison.
///
/// All matches are exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct IgnorePolicy {
    tables: HashSet<String>,
    columns: HashSet<String>,
    table_columns: HashMap<String, HashSet<String>>,
    types: HashSet<String>,
}

impl IgnorePolicy {
    pub fn from_config(config: &Config) -> Self {
        let mut table_columns: HashMap<String, HashSet<String>> = HashMap::new();
        for entry in &config.ignore_table_columns {
            table_columns
                .entry(entry.table_name.clone())
                .or_default()
                .extend(entry.columns.iter().cloned());
        }

        Self {
            tables: config.ignore_tables.iter().cloned().collect(),
            columns: config.ignore_columns.iter().cloned().collect(),
            table_columns,
            types: config.ignore_types.iter().cloned().collect(),
        }
    }

    pub fn is_table_ignored(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// True if `column` is ignored everywhere or just for `table`
    pub fn is_column_ignored(&self, table: &str, column: &str) -> bool {
        self.columns.contains(column)
            || self
                .table_columns
                .get(table)
                .is_some_and(|cols| cols.contains(column))
    }

    pub fn is_type_ignored(&self, data_type: &str) -> bool {
        self.types.contains(data_type)
    }
}
