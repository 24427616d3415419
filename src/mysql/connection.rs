// ABOUTME: MySQL connection utilities for comparison sessions
// ABOUTME: Builds pool options, verifies connectivity and explains failures

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use mysql_async::prelude::*;
use mysql_async::{Opts, OptsBuilder, Pool};
use std::time::Duration;

/// Upper bound for the initial connectivity check
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Build driver options from a configured database entry
pub fn build_opts(config: &DatabaseConfig) -> Opts {
    OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.username.clone()))
        .pass(Some(config.password.clone()))
        .db_name(Some(config.database.clone()))
        .into()
}

/// Open a pool for `config` and verify it answers a ping within [`PING_TIMEOUT`].
///
/// Failures are fatal for the run; there is no retry.
pub async fn connect(config: &DatabaseConfig) -> Result<Pool> {
    tracing::debug!(
        "Connecting to {}:{}/{} as {}",
        config.host,
        config.port,
        config.database,
        config.username
    );

    let pool = Pool::new(build_opts(config));

    let ping = async {
        let mut conn = pool.get_conn().await?;
        conn.ping().await?;
        Ok::<_, mysql_async::Error>(())
    };

    let outcome = tokio::time::timeout(PING_TIMEOUT, ping).await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            // Release sockets before reporting
            let _ = pool.disconnect().await;
            return Err(explain_connect_error(&e.to_string()))
                .with_context(|| format!("pinging database '{}'", config.display_label()));
        }
        Err(_) => {
            let _ = pool.disconnect().await;
            anyhow::bail!(
                "Connection timeout: database '{}' at {}:{} did not answer within {:?}",
                config.display_label(),
                config.host,
                config.port,
                PING_TIMEOUT
            );
        }
    }

    tracing::info!(
        "Connected to {} ({}:{}/{})",
        config.display_label(),
        config.host,
        config.port,
        config.database
    );

    Ok(pool)
}

/// Turn a raw driver message into an error with a hint about the likely cause
fn explain_connect_error(error_msg: &str) -> anyhow::Error {
    if error_msg.contains("Access denied") {
        anyhow::anyhow!(
            "Authentication failed: Invalid username or password.\n\
             Please verify your database credentials.\n\
             Error: {}",
            error_msg
        )
    } else if error_msg.contains("Unknown database") {
        anyhow::anyhow!(
            "Database does not exist: {}\n\
             Please check the database name in the configuration.",
            error_msg
        )
    } else if error_msg.contains("Connection refused") {
        anyhow::anyhow!(
            "Connection refused: Unable to reach database server.\n\
             Please check:\n\
             - The host and port are correct\n\
             - The database server is running\n\
             - Firewall rules allow connections\n\
             Error: {}",
            error_msg
        )
    } else if error_msg.contains("timeout") || error_msg.contains("timed out") {
        anyhow::anyhow!(
            "Connection timeout: Database server did not respond in time.\n\
             Error: {}",
            error_msg
        )
    } else {
        anyhow::anyhow!("Failed to connect to database: {}", error_msg)
    }
}
