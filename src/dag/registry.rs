// src/dag/registry.rs

//! Task storage: unit of work, declared dependencies and execution state.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::engine::TaskName;
use crate::errors::RunnerError;
use crate::exec::Work;

/// Execution state of a task entry.
///
/// An error only exists once the task has actually been executed.
#[derive(Debug, Clone, Default)]
pub enum ExecState {
    /// Not run yet (or only ever failed through an upstream dependency).
    #[default]
    Pending,
    /// The unit of work has been invoked; holds its error, if any.
    Executed(Option<RunnerError>),
    /// Marked with `Runner::skip`; treated as a success without running.
    Skipped,
}

impl ExecState {
    /// Error recorded by a previous execution.
    pub fn recorded_error(&self) -> Option<&RunnerError> {
        match self {
            ExecState::Executed(err) => err.as_ref(),
            ExecState::Pending | ExecState::Skipped => None,
        }
    }
}

/// Execution state of one task, shared between the registry and whatever
/// executor node is running it.
///
/// The lock is only ever held for a read or a swap, never across an await.
#[derive(Debug, Default)]
pub struct StateCell(Arc<Mutex<ExecState>>);

impl StateCell {
    fn lock(&self) -> MutexGuard<'_, ExecState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Another handle on the same state.
    pub fn share(&self) -> Self {
        Self(Arc::clone(&self.0))
    }

    pub fn get(&self) -> ExecState {
        self.lock().clone()
    }

    pub fn set(&self, state: ExecState) {
        *self.lock() = state;
    }

    pub fn recorded_error(&self) -> Option<RunnerError> {
        self.lock().recorded_error().cloned()
    }

    /// Return the current state. A pending task is moved to
    /// `Executed(Some(Aborted))` in the same step, so the caller owns the
    /// only invocation and a run dropped before [`StateCell::set`] leaves
    /// the task failed rather than pending.
    pub fn claim(&self, name: &str) -> ExecState {
        let mut state = self.lock();
        let seen = state.clone();
        if matches!(seen, ExecState::Pending) {
            *state = ExecState::Executed(Some(RunnerError::Aborted(name.to_string())));
        }
        seen
    }

    /// `Pending` becomes `Skipped`; anything else is left alone.
    fn skip_if_pending(&self) -> bool {
        let mut state = self.lock();
        if matches!(*state, ExecState::Pending) {
            *state = ExecState::Skipped;
            return true;
        }
        false
    }
}

/// Public, read-only view of a task's execution state.
#[derive(Debug, Clone)]
pub enum TaskStatus {
    Pending,
    Skipped,
    Succeeded,
    Failed(RunnerError),
}

impl From<&ExecState> for TaskStatus {
    fn from(state: &ExecState) -> Self {
        match state {
            ExecState::Pending => TaskStatus::Pending,
            ExecState::Skipped => TaskStatus::Skipped,
            ExecState::Executed(None) => TaskStatus::Succeeded,
            ExecState::Executed(Some(err)) => TaskStatus::Failed(err.clone()),
        }
    }
}

/// One registered task.
pub struct TaskEntry {
    pub work: Arc<dyn Work>,
    /// Dependency names exactly as declared (duplicates included).
    pub deps: Vec<TaskName>,
    pub state: StateCell,
}

impl std::fmt::Debug for TaskEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEntry")
            .field("deps", &self.deps)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// All tasks of a runner, keyed by name.
///
/// A `BTreeMap` keeps iteration order stable, which makes validation errors
/// and listings deterministic.
#[derive(Debug, Default)]
pub struct Registry {
    tasks: BTreeMap<TaskName, TaskEntry>,
}

impl Registry {
    /// Register a new pending task.
    pub fn insert(
        &mut self,
        name: TaskName,
        work: Arc<dyn Work>,
        deps: Vec<TaskName>,
    ) -> Result<(), RunnerError> {
        if self.tasks.contains_key(&name) {
            return Err(RunnerError::DuplicateTask(name));
        }

        debug!(task = %name, ?deps, "registered task");
        self.tasks.insert(
            name,
            TaskEntry {
                work,
                deps,
                state: StateCell::default(),
            },
        );
        Ok(())
    }

    /// Move a pending task to `Skipped`. Unknown names and tasks that are
    /// not pending are left alone.
    pub fn skip(&mut self, name: &str) {
        if let Some(entry) = self.tasks.get(name)
            && entry.state.skip_if_pending()
        {
            debug!(task = %name, "marked task as skipped");
        }
    }

    pub fn get(&self, name: &str) -> Option<&TaskEntry> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskName, &TaskEntry)> {
        self.tasks.iter()
    }

    /// Declared dependencies of a task (empty for unknown names).
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.tasks
            .get(name)
            .map(|entry| entry.deps.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
