// ABOUTME: Strategy dispatch for comparison runs
// ABOUTME: Maps the chosen mode to its command implementation

pub mod diff;
pub mod dump;
pub mod live;

pub use diff::{diff, run_diff};
pub use dump::{dump, two_dumps};
pub use live::live;

use crate::config::Config;
use crate::error::CompareError;
use crate::policy::IgnorePolicy;
use anyhow::Result;
use std::fmt;
use std::str::FromStr;

/// The four mutually exclusive comparison modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Snapshot the first database into `dir`
    Dump,
    /// Snapshot both databases into `dir` and `dir2`
    TwoDumps,
    /// Compare both databases directly
    Live,
    /// Run the external diff tool over `dir` and `dir2`
    Diff,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Dump => "dump",
            Strategy::TwoDumps => "twodumps",
            Strategy::Live => "live",
            Strategy::Diff => "diff",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the strategy token given on the command line; an unknown token
/// is [`CompareError::InvalidStrategy`].
impl FromStr for Strategy {
    type Err = CompareError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dump" => Ok(Strategy::Dump),
            "twodumps" => Ok(Strategy::TwoDumps),
            "live" => Ok(Strategy::Live),
            "diff" => Ok(Strategy::Diff),
            other => Err(CompareError::InvalidStrategy(other.to_string())),
        }
    }
}

/// Run one comparison with `strategy`.
///
/// The ignore policy is built once here and handed to whichever command runs.
pub async fn run_compare(config: &Config, strategy: Strategy) -> Result<()> {
    tracing::info!("Running strategy '{}'", strategy);
    let policy = IgnorePolicy::from_config(config);

    match strategy {
        Strategy::Dump => dump(config, &policy).await,
        Strategy::TwoDumps => two_dumps(config, &policy).await,
        Strategy::Live => live(config, &policy).await,
        Strategy::Diff => diff(config).await,
    }
}
