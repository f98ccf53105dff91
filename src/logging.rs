// src/logging.rs

//! Logging setup for `deptask` using `tracing` + `tracing-subscriber`.
//!
//! The filter is chosen in this order:
//! 1. `--log-level` on the command line (applies to every target)
//! 2. `DEPTASK_LOG`, which takes full `EnvFilter` directives, e.g.
//!    `DEPTASK_LOG=info,deptask::exec=debug`
//! 3. `info`
//!
//! Logs go to STDERR so task output piped through stdout stays clean.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable read when `--log-level` is absent.
pub const LOG_ENV: &str = "DEPTASK_LOG";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

/// Resolve the filter for `cli_level`, falling back to [`LOG_ENV`] and then
/// `info`. An unparsable `DEPTASK_LOG` is ignored.
pub fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
    }
}
