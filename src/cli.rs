// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;
use crate::types::ExecutionMode;

/// Command-line arguments for `deptask`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "deptask",
    version,
    about = "Run shell tasks in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Run only this task and everything it depends on. Repeatable.
    #[arg(long = "task", value_name = "NAME")]
    pub tasks: Vec<String>,

    /// Skip this task (in addition to `skip = true` in the file). Repeatable.
    #[arg(long = "skip", value_name = "NAME")]
    pub skip: Vec<String>,

    /// Run one task at a time, overriding `[config].mode`.
    #[arg(long, conflicts_with = "concurrent")]
    pub sequential: bool,

    /// Run independent tasks at the same time, overriding `[config].mode`.
    #[arg(long)]
    pub concurrent: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEPTASK_LOG` (any `EnvFilter` directive) or `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the execution layers, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Mode forced on the command line, if any.
    pub fn mode_override(&self) -> Option<ExecutionMode> {
        if self.sequential {
            Some(ExecutionMode::Sequential)
        } else if self.concurrent {
            Some(ExecutionMode::Concurrent)
        } else {
            None
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The level as an `EnvFilter` directive.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
