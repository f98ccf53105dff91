//! Builders for pipeline configs, so tests don't have to write TOML.

use deptask::config::{ConfigFile, RawConfigFile, TaskConfig};
use deptask::errors::Result;
use deptask::types::ExecutionMode;

/// Builds a [`ConfigFile`] task by task.
#[derive(Debug, Default)]
pub struct ConfigFileBuilder {
    raw: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.raw.task.insert(name.to_string(), task);
        self
    }

    /// Shortcut for a task with a command and nothing else.
    pub fn command(self, name: &str, cmd: &str) -> Self {
        self.with_task(name, TaskConfigBuilder::new(cmd).build())
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.raw.config.mode = mode;
        self
    }

    /// The unvalidated config.
    pub fn build_raw(self) -> RawConfigFile {
        self.raw
    }

    /// Run config validation on the result.
    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.raw)
    }

    /// Like [`ConfigFileBuilder::try_build`], panicking on invalid input.
    pub fn build(self) -> ConfigFile {
        match self.try_build() {
            Ok(cfg) => cfg,
            Err(err) => panic!("builder produced an invalid config: {err}"),
        }
    }
}

/// Builds a single `[task.<name>]` entry.
#[derive(Debug)]
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                after: Vec::new(),
                skip: false,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.task.skip = skip;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
