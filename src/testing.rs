// ABOUTME: Scripted in-memory session for unit tests
// ABOUTME: Replays expected queries in order and returns canned rows or errors

use crate::mysql::{Session, TextRow};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;

struct Expectation {
    sql: String,
    params: Option<Vec<String>>,
    response: std::result::Result<Vec<TextRow>, String>,
}

/// Session that expects an exact sequence of queries.
///
/// An unexpected query is returned as an error so the code under test
/// surfaces it like any other query failure.
pub struct FakeSession {
    label: String,
    database: String,
    expectations: VecDeque<Expectation>,
    pub executed: Vec<String>,
}

impl FakeSession {
    pub fn new(label: &str, database: &str) -> Self {
        Self {
            label: label.to_string(),
            database: database.to_string(),
            expectations: VecDeque::new(),
            executed: Vec::new(),
        }
    }

    pub fn expect(&mut self, sql: impl Into<String>, rows: Vec<TextRow>) -> &mut Self {
        self.expectations.push_back(Expectation {
            sql: sql.into(),
            params: None,
            response: Ok(rows),
        });
        self
    }

    pub fn expect_with_params(
        &mut self,
        sql: impl Into<String>,
        params: &[&str],
        rows: Vec<TextRow>,
    ) -> &mut Self {
        self.expectations.push_back(Expectation {
            sql: sql.into(),
            params: Some(params.iter().map(|p| p.to_string()).collect()),
            response: Ok(rows),
        });
        self
    }

    pub fn expect_error(&mut self, sql: impl Into<String>, message: &str) -> &mut Self {
        self.expectations.push_back(Expectation {
            sql: sql.into(),
            params: None,
            response: Err(message.to_string()),
        });
        self
    }

    /// True once every scripted query has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.expectations.is_empty()
    }
}

#[async_trait]
impl Session for FakeSession {
    fn label(&self) -> &str {
        &self.label
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<TextRow>> {
        self.executed.push(sql.to_string());

        let Some(next) = self.expectations.pop_front() else {
            anyhow::bail!("unexpected query on '{}': {}", self.label, sql);
        };
        if next.sql != sql {
            anyhow::bail!(
                "query mismatch on '{}': expected {:?}, got {:?}",
                self.label,
                next.sql,
                sql
            );
        }
        if let Some(expected) = next.params {
            let actual: Vec<String> = params.iter().map(|p| p.to_string()).collect();
            if expected != actual {
                anyhow::bail!(
                    "parameter mismatch on '{}': expected {:?}, got {:?}",
                    self.label,
                    expected,
                    actual
                );
            }
        }

        next.response.map_err(|msg| anyhow::anyhow!(msg))
    }
}

/// Build a text row from literals, `None` standing for SQL NULL
pub fn row(cells: &[Option<&str>]) -> TextRow {
    cells.iter().map(|c| c.map(str::to_string)).collect()
}
