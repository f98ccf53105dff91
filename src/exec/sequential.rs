// src/exec/sequential.rs

//! Sequential executor: one task at a time, dependencies first, fail-fast.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::dag::{Layering, Registry};
use crate::engine::TaskName;
use crate::errors::RunnerError;

use super::context::TaskContext;
use super::memo::{RunHooks, run_memoized};

/// Run the `selected` tasks in layer order (leaves first).
///
/// A task whose dependency has a recorded failure fails with that exact
/// error without running its own work. The first failure ends the run;
/// tasks later in the order are never started.
pub async fn run_sequential(
    registry: &Registry,
    layering: &Layering,
    selected: &BTreeSet<TaskName>,
    hooks: &RunHooks,
    ctx: &TaskContext,
) -> Result<(), RunnerError> {
    info!(tasks = selected.len(), "starting sequential run");

    for name in layering.dependencies_first() {
        if !selected.contains(name) {
            continue;
        }

        if ctx.is_cancelled() {
            debug!(task = %name, "context cancelled before task could start");
            return Err(RunnerError::Cancelled);
        }

        if let Some(err) = failed_dependency(registry, name) {
            debug!(task = %name, error = %err, "dependency failed earlier; inheriting its error");
            return Err(err);
        }

        let Some(entry) = registry.get(name) else {
            continue;
        };
        run_memoized(name, &entry.work, &entry.state, hooks, ctx).await?;
    }

    debug!("sequential run finished");
    Ok(())
}

/// First recorded error among the direct dependencies of `name`.
fn failed_dependency(registry: &Registry, name: &str) -> Option<RunnerError> {
    registry
        .dependencies_of(name)
        .iter()
        .filter_map(|dep| registry.get(dep))
        .find_map(|dep| dep.state.recorded_error())
}
