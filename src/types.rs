use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How the CLI executes a pipeline.
///
/// - `Concurrent` (default): every task whose dependencies are done runs at
///   the same time as any other such task.
/// - `Sequential`: one task at a time, dependencies first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Concurrent,
    Sequential,
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concurrent" => Ok(ExecutionMode::Concurrent),
            "sequential" => Ok(ExecutionMode::Sequential),
            other => Err(format!(
                "invalid mode: {other} (expected \"concurrent\" or \"sequential\")"
            )),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Concurrent => f.write_str("concurrent"),
            ExecutionMode::Sequential => f.write_str("sequential"),
        }
    }
}
