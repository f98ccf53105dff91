// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::engine::Runner;
use crate::errors::RunnerError;
use crate::exec::ShellCommand;
use crate::types::ExecutionMode;

/// Pipeline file exactly as deserialized, before validation.
///
/// ```toml
/// [config]
/// mode = "concurrent"
///
/// [task.fetch]
/// cmd = "git fetch"
///
/// [task.build]
/// cmd = "cargo build"
/// after = ["fetch"]
/// ```
///
/// All sections are optional at this stage; [`ConfigFile`] is the validated
/// form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Keys are task names.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// `"concurrent"` (default) or `"sequential"`.
    #[serde(default)]
    pub mode: ExecutionMode,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Command line run through the platform shell.
    pub cmd: String,

    /// Names of tasks that must succeed before this one starts.
    #[serde(default)]
    pub after: Vec<String>,

    /// Register the task but never run it; dependents proceed as if it had
    /// succeeded.
    #[serde(default)]
    pub skip: bool,
}

/// A validated pipeline file. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { config, task }
    }

    /// Register every task as a [`ShellCommand`] in a new [`Runner`] and
    /// apply `skip = true`.
    ///
    /// Dependency names are not checked here; `Runner::validate` does that.
    pub fn build_runner(&self) -> Result<Runner, RunnerError> {
        let mut runner = Runner::new();

        for (name, task) in self.task.iter() {
            let deps: Vec<&str> = task.after.iter().map(String::as_str).collect();
            runner.add(name.clone(), ShellCommand::new(name.clone(), task.cmd.clone()), &deps)?;
        }

        let skipped: Vec<&str> = self
            .task
            .iter()
            .filter(|(_, task)| task.skip)
            .map(|(name, _)| name.as_str())
            .collect();
        runner.skip(&skipped);

        Ok(runner)
    }
}
