// ABOUTME: CLI entry point for mysql-db-compare
// ABOUTME: Parses arguments, loads the configuration and runs the chosen strategy

use clap::Parser;
use mysql_db_compare::commands::{self, Strategy};
use mysql_db_compare::config::Config;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "mysql-db-compare")]
#[command(about = "Compare two MySQL databases by schema and data", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file (default: config.yaml)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
    /// Comparison strategy: dump, twodumps, live or diff
    #[arg(short = 's', long, value_parser = Strategy::from_str)]
    strategy: Strategy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!("Running strategy {}", cli.strategy);

    commands::run_compare(&config, cli.strategy).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_strategy_and_config() {
        let cli = Cli::try_parse_from(["mysql-db-compare", "-c", "prod.yaml", "-s", "twodumps"])
            .unwrap();
        assert_eq!(cli.strategy, Strategy::TwoDumps);
        assert_eq!(cli.config, Some(PathBuf::from("prod.yaml")));
    }

    #[test]
    fn test_cli_rejects_unknown_strategy() {
        let err = match Cli::try_parse_from(["mysql-db-compare", "--strategy", "compare"]) {
            Ok(_) => panic!("unknown strategy accepted"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("strategy not valid: 'compare'"));
    }
}
