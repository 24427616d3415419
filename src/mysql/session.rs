// ABOUTME: Query session abstraction bound to one read snapshot
// ABOUTME: MySQL implementation runs every query inside a consistent-snapshot transaction

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Pool, Row, Transaction, TxOpts, Value};

/// One result row, each cell as text or `None` for SQL NULL
pub type TextRow = Vec<Option<String>>;

/// A read-only view of one database for the duration of a run.
///
/// Every call returns the full result set, so no result is ever left open
/// when the next query is issued.
#[async_trait]
pub trait Session: Send {
    /// Display label used in reports
    fn label(&self) -> &str;

    /// Name of the schema the session reads
    fn database(&self) -> &str;

    /// Run `sql` with positional `params` and return all rows as text
    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<TextRow>>;
}

/// MySQL session holding a read-only, consistent-snapshot transaction.
pub struct MysqlSession {
    label: String,
    database: String,
    pool: Pool,
    tx: Transaction<'static>,
}

impl MysqlSession {
    /// Connect to `config` and open the snapshot transaction all later queries share.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let pool = super::connect(config).await?;

        let mut opts = TxOpts::default();
        opts.with_consistent_snapshot(true).with_readonly(Some(true));

        let tx = match pool.start_transaction(opts).await {
            Ok(tx) => tx,
            Err(e) => {
                let _ = pool.disconnect().await;
                return Err(e).with_context(|| {
                    format!(
                        "starting read transaction on '{}'",
                        config.display_label()
                    )
                });
            }
        };

        Ok(Self {
            label: config.display_label().to_string(),
            database: config.database.clone(),
            pool,
            tx,
        })
    }

    /// End the snapshot and release the pool's connections.
    ///
    /// Dropping the session releases them too; this only makes it prompt.
    pub async fn close(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .with_context(|| format!("closing read transaction on '{}'", self.label))?;
        self.pool
            .disconnect()
            .await
            .with_context(|| format!("disconnecting from '{}'", self.label))?;
        Ok(())
    }
}

#[async_trait]
impl Session for MysqlSession {
    fn label(&self) -> &str {
        &self.label
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<TextRow>> {
        tracing::trace!("[{}] {}", self.label, sql);

        // Text protocol when there is nothing to bind, so values arrive exactly
        // as the server renders them
        let rows: Vec<Row> = if params.is_empty() {
            self.tx.query(sql).await
        } else {
            let params: Vec<Value> = params.iter().map(|p| Value::from(*p)).collect();
            self.tx.exec(sql, params).await
        }
        .with_context(|| format!("query on '{}' failed: {}", self.label, sql))?;

        Ok(rows
            .into_iter()
            .map(|row| row.unwrap().into_iter().map(value_to_text).collect())
            .collect())
    }
}

/// Render a driver value the way the server's text protocol would
pub fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }),
        Value::Int(v) => Some(v.to_string()),
        Value::UInt(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Double(v) => Some(v.to_string()),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let date = format!("{:04}-{:02}-{:02}", year, month, day);
            if hour == 0 && minute == 0 && second == 0 && micros == 0 {
                Some(date)
            } else {
                Some(format!(
                    "{} {}",
                    date,
                    format_clock(u32::from(hour), minute, second, micros)
                ))
            }
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = days * 24 + u32::from(hours);
            let sign = if negative { "-" } else { "" };
            Some(format!(
                "{}{}",
                sign,
                format_clock(total_hours, minutes, seconds, micros)
            ))
        }
    }
}

fn format_clock(hours: u32, minutes: u8, seconds: u8, micros: u32) -> String {
    if micros == 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}.{:06}", hours, minutes, seconds, micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_to_text_null_and_bytes() {
        assert_eq!(value_to_text(Value::NULL), None);
        assert_eq!(
            value_to_text(Value::Bytes(b"Test Name 1".to_vec())),
            Some("Test Name 1".to_string())
        );
        // Empty string stays distinct from NULL
        assert_eq!(value_to_text(Value::Bytes(Vec::new())), Some(String::new()));
    }

    #[test]
    fn test_value_to_text_numbers() {
        assert_eq!(value_to_text(Value::Int(-42)), Some("-42".to_string()));
        assert_eq!(value_to_text(Value::UInt(7)), Some("7".to_string()));
        assert_eq!(value_to_text(Value::Double(1.5)), Some("1.5".to_string()));
    }

    #[test]
    fn test_value_to_text_dates() {
        assert_eq!(
            value_to_text(Value::Date(2024, 3, 9, 0, 0, 0, 0)),
            Some("2024-03-09".to_string())
        );
        assert_eq!(
            value_to_text(Value::Date(2024, 3, 9, 14, 5, 0, 0)),
            Some("2024-03-09 14:05:00".to_string())
        );
        assert_eq!(
            value_to_text(Value::Date(2024, 3, 9, 14, 5, 0, 120)),
            Some("2024-03-09 14:05:00.000120".to_string())
        );
    }

    #[test]
    fn test_value_to_text_time_folds_days_into_hours() {
        assert_eq!(
            value_to_text(Value::Time(true, 1, 2, 3, 4, 0)),
            Some("-26:03:04".to_string())
        );
    }

    #[test]
    fn test_value_to_text_invalid_utf8_is_lossy() {
        let text = value_to_text(Value::Bytes(vec![b'a', 0xff, b'b'])).unwrap();
        assert!(text.starts_with('a'));
        assert!(text.ends_with('b'));
    }
}
