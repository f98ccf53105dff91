// src/engine/runner.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dag::{
    Layering, Registry, TaskStatus, applicable_tasks, cyclic_tasks, list_deps, validate_graph,
};
use crate::engine::TaskName;
use crate::errors::RunnerError;
use crate::exec::{RunHooks, TaskContext, Work, run_concurrent, run_sequential};

/// Registers tasks with their dependencies and runs them in dependency order.
///
/// - Every `run*` method validates the graph first (missing dependencies,
///   cycles). The validation result is cached until the next [`Runner::add`].
/// - Execution state is sticky: once a task has executed (or has been
///   skipped) later runs on the same `Runner` reuse that outcome instead of
///   invoking the work again. Use [`Runner::copy_to`] to get a fresh runner
///   for the same tasks. A task is claimed before its work starts, so a run
///   future dropped mid-flight leaves it failed with
///   [`RunnerError::Aborted`], never pending.
/// - All runs are fail-fast. A task whose dependency failed fails with the
///   very same error without running.
///
/// Mutating and running methods take `&mut self`, so registration can never
/// overlap a run and a `Runner` is never driven by two runs at once.
#[derive(Debug, Default)]
pub struct Runner {
    registry: Registry,
    hooks: RunHooks,
    /// `None` until validated; reset by every successful `add`.
    validation: Option<Result<Layering, RunnerError>>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner that calls `hooks` around every task it executes.
    pub fn with_hooks(hooks: RunHooks) -> Self {
        Self {
            hooks,
            ..Self::default()
        }
    }

    /// Register a task. Fails with [`RunnerError::DuplicateTask`] if `name`
    /// is taken.
    ///
    /// Dependencies are only checked by [`Runner::validate`], so tasks can be
    /// added in any order.
    pub fn add(
        &mut self,
        name: impl Into<TaskName>,
        work: impl Work + 'static,
        deps: &[&str],
    ) -> Result<(), RunnerError> {
        let deps = deps.iter().map(|dep| dep.to_string()).collect();
        self.add_shared(name.into(), Arc::new(work), deps)
    }

    /// Like [`Runner::add`] but panics on error.
    ///
    /// Meant for static registration code where a duplicate name is a bug.
    pub fn must_add(&mut self, name: impl Into<TaskName>, work: impl Work + 'static, deps: &[&str]) {
        let name = name.into();
        if let Err(err) = self.add(name.clone(), work, deps) {
            panic!("failed to register task '{name}': {err}");
        }
    }

    fn add_shared(
        &mut self,
        name: TaskName,
        work: Arc<dyn Work>,
        deps: Vec<TaskName>,
    ) -> Result<(), RunnerError> {
        self.registry.insert(name, work, deps)?;
        self.validation = None;
        Ok(())
    }

    /// Mark tasks as skipped: they will never run, and their dependents
    /// behave as if they had succeeded.
    ///
    /// Unknown names and tasks that already ran are ignored.
    pub fn skip(&mut self, names: &[&str]) {
        for name in names {
            self.registry.skip(name);
        }
    }

    /// Whether `name` is currently marked as skipped.
    pub fn skipped(&self, name: &str) -> Result<bool, RunnerError> {
        match self.status(name)? {
            TaskStatus::Skipped => Ok(true),
            _ => Ok(false),
        }
    }

    /// Execution status of a single task.
    pub fn status(&self, name: &str) -> Result<TaskStatus, RunnerError> {
        self.registry
            .get(name)
            .map(|entry| TaskStatus::from(&entry.state.get()))
            .ok_or_else(|| RunnerError::MissingTask(name.to_string()))
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Declared dependencies of `name` (empty for unknown tasks).
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.registry.dependencies_of(name)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Transitive dependencies of `names`, or every task when `names` is
    /// empty. Order is unspecified.
    ///
    /// Assumes an acyclic graph; call [`Runner::validate`] first.
    pub fn list_deps(&self, names: &[&str]) -> Vec<TaskName> {
        list_deps(&self.registry, names)
    }

    /// Check for missing dependencies and cycles.
    ///
    /// The result is cached until the next successful [`Runner::add`].
    pub fn validate(&mut self) -> Result<(), RunnerError> {
        self.checked_layering().map(|_| ())
    }

    /// Topological layers, dependents first (see [`Layering`]).
    pub fn layers(&mut self) -> Result<Vec<Vec<TaskName>>, RunnerError> {
        self.checked_layering()
            .map(|layering| layering.layers().to_vec())
    }

    /// Groups of tasks that take part in a cycle. Empty for acyclic graphs.
    pub fn cyclic_tasks(&self) -> Vec<Vec<TaskName>> {
        cyclic_tasks(&self.registry)
    }

    fn checked_layering(&mut self) -> Result<Layering, RunnerError> {
        let registry = &self.registry;
        let outcome = self.validation.get_or_insert_with(|| {
            let outcome = validate_graph(registry);
            match &outcome {
                Ok(layering) => debug!(layers = layering.layers().len(), "graph validated"),
                Err(err) => debug!(error = %err, "graph validation failed"),
            }
            outcome
        });
        outcome.clone()
    }

    /// Copy `names` and their transitive dependencies into `dst`.
    ///
    /// Only the unit of work (shared, not cloned) and the declared
    /// dependencies are copied, never the execution state. Unknown names are
    /// ignored, as are tasks `dst` already has. With no names every task is
    /// copied.
    pub fn copy_to(&mut self, dst: &mut Runner, names: &[&str]) -> Result<(), RunnerError> {
        self.validate()?;

        for name in applicable_tasks(&self.registry, names) {
            let Some(entry) = self.registry.get(&name) else {
                continue;
            };
            if let Err(err) = dst.add_shared(name.clone(), Arc::clone(&entry.work), entry.deps.clone())
            {
                debug!(task = %name, error = %err, "destination already has task; not copied");
            }
        }
        Ok(())
    }

    /// Run every task sequentially. Shortcut for `run_some_sync(ctx, &[])`.
    pub async fn run_sync(&mut self, ctx: &TaskContext) -> Result<(), RunnerError> {
        self.run_some_sync(ctx, &[]).await
    }

    /// Run every task concurrently. Shortcut for `run_some(ctx, &[])`.
    pub async fn run(&mut self, ctx: &TaskContext) -> Result<(), RunnerError> {
        self.run_some(ctx, &[]).await
    }

    /// Run `names` and their dependencies one at a time, dependencies first.
    ///
    /// Returns on the first failure. Order among independent tasks is
    /// unspecified.
    pub async fn run_some_sync(
        &mut self,
        ctx: &TaskContext,
        names: &[&str],
    ) -> Result<(), RunnerError> {
        let layering = self.checked_layering()?;
        let selected = self.select(names);
        info!(requested = ?names, tasks = selected.len(), "running tasks sequentially");

        run_sequential(&self.registry, &layering, &selected, &self.hooks, ctx).await
    }

    /// Run `names` and their dependencies concurrently.
    ///
    /// The first failure cancels every task that has not started yet; the
    /// call still waits for in-flight tasks before returning.
    pub async fn run_some(&mut self, ctx: &TaskContext, names: &[&str]) -> Result<(), RunnerError> {
        self.checked_layering()?;
        let selected = self.select(names);
        info!(requested = ?names, tasks = selected.len(), "running tasks concurrently");

        run_concurrent(&self.registry, &selected, &self.hooks, ctx).await
    }

    fn select(&self, names: &[&str]) -> BTreeSet<TaskName> {
        for name in names {
            if !self.registry.contains(name) {
                warn!(task = %name, "requested task is not registered; ignoring");
            }
        }
        applicable_tasks(&self.registry, names)
    }
}
