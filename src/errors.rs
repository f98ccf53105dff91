// src/errors.rs

//! Crate-wide error types.
//!
//! - [`RunnerError`] is what the dependency runner reports. It is `Clone`
//!   because a single task failure is handed verbatim to every dependent and
//!   to the aggregate result of a run.
//! - [`DeptaskError`] is the application-level error used by config loading
//!   and the CLI.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Error returned by a unit of work, shared between every place that
/// observes it.
///
/// The `anyhow::Error` from the work is never wrapped or re-formatted, so callers
/// can downcast it back to their own error type.
#[derive(Clone)]
pub struct TaskFailure(Arc<anyhow::Error>);

impl TaskFailure {
    pub fn new(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }

    /// Downcast the inner error to a concrete type.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// Whether both values carry the very same failure instance.
    pub fn ptr_eq(&self, other: &TaskFailure) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<anyhow::Error> for TaskFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::new(err)
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl std::error::Error for TaskFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

#[derive(Error, Debug, Clone)]
pub enum RunnerError {
    #[error("duplicated task name: {0}")]
    DuplicateTask(String),

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("missing task: {0}")]
    MissingTask(String),

    #[error("cyclic dependencies detected")]
    Cyclic,

    #[error(transparent)]
    Task(TaskFailure),

    #[error("execution cancelled")]
    Cancelled,

    #[error("task '{0}' was aborted before signalling completion")]
    Aborted(String),
}

impl RunnerError {
    /// Wrap an error returned by a unit of work.
    pub fn task(err: anyhow::Error) -> Self {
        RunnerError::Task(TaskFailure::new(err))
    }

    /// The unit-of-work failure carried by this error, if any.
    pub fn task_failure(&self) -> Option<&TaskFailure> {
        match self {
            RunnerError::Task(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunnerError::Cancelled)
    }
}

#[derive(Error, Debug)]
pub enum DeptaskError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DeptaskError>;
