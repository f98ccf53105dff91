// src/exec/concurrent.rs

//! Concurrent executor: one Tokio task per selected task, joined by
//! per-task completion signals.
//!
//! Every node waits for the completion signal of each of its dependencies
//! (or for cancellation of the run), then performs its memoized run and
//! publishes the outcome on its own signal. The signal is a `watch` channel
//! that starts out as `None` and is set exactly once, so any number of
//! dependents can wait on it and late observers see the value immediately.
//!
//! The first failure cancels the run's context, which releases every node
//! still waiting on a dependency. A dependency that has already published
//! its outcome wins over cancellation, so its dependents inherit the real
//! error. The aggregate still waits for all nodes to finish before
//! returning.
//!
//! Nodes share each task's [`StateCell`] with the registry, so the state
//! stays correct even if the run future is dropped while nodes are in
//! flight.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::dag::{Registry, StateCell};
use crate::engine::TaskName;
use crate::errors::RunnerError;

use super::context::TaskContext;
use super::memo::{RunHooks, run_memoized};
use super::work::Work;

/// Value carried by a completion signal: `None` until the node finishes.
type Completion = Option<Result<(), RunnerError>>;

/// Per-task execution node.
struct ExecNode {
    name: TaskName,
    work: Arc<dyn Work>,
    state: StateCell,
    deps: Vec<(TaskName, watch::Receiver<Completion>)>,
    done: watch::Sender<Completion>,
}

/// What a finished node hands back to the aggregate.
struct NodeReport {
    name: TaskName,
    result: Result<(), RunnerError>,
}

impl ExecNode {
    async fn run(mut self, hooks: RunHooks, ctx: TaskContext) -> NodeReport {
        let result = self.execute(&hooks, &ctx).await;
        self.done.send_replace(Some(result.clone()));

        NodeReport {
            name: self.name,
            result,
        }
    }

    async fn execute(&mut self, hooks: &RunHooks, ctx: &TaskContext) -> Result<(), RunnerError> {
        for (dep, rx) in self.deps.iter_mut() {
            let observed = tokio::select! {
                biased;
                signal = rx.wait_for(Option::is_some) => signal.map(|value| (*value).clone()),
                _ = ctx.cancelled() => {
                    debug!(task = %self.name, dep = %dep, "cancelled while waiting on dependency");
                    return Err(RunnerError::Cancelled);
                }
            };

            match observed {
                Ok(Some(Err(err))) => {
                    debug!(
                        task = %self.name,
                        dep = %dep,
                        error = %err,
                        "dependency failed; inheriting its error"
                    );
                    return Err(err);
                }
                Ok(_) => {}
                Err(_) => {
                    warn!(task = %self.name, dep = %dep, "dependency vanished without signalling");
                    return Err(RunnerError::Aborted(dep.clone()));
                }
            }
        }

        if ctx.is_cancelled() {
            debug!(task = %self.name, "context cancelled before task could start");
            return Err(RunnerError::Cancelled);
        }

        run_memoized(&self.name, &self.work, &self.state, hooks, ctx).await
    }
}

/// Build one node per selected task, wired to the completion signals of its
/// (selected) dependencies.
fn build_nodes(registry: &Registry, selected: &BTreeSet<TaskName>) -> Vec<ExecNode> {
    let mut senders: HashMap<&str, watch::Sender<Completion>> = HashMap::new();
    let mut receivers: HashMap<&str, watch::Receiver<Completion>> = HashMap::new();

    for name in selected.iter() {
        let (tx, rx) = watch::channel(None);
        senders.insert(name.as_str(), tx);
        receivers.insert(name.as_str(), rx);
    }

    let mut nodes = Vec::with_capacity(selected.len());
    for name in selected.iter() {
        let (Some(entry), Some(done)) = (registry.get(name), senders.remove(name.as_str())) else {
            continue;
        };

        let deps = entry
            .deps
            .iter()
            .filter_map(|dep| {
                receivers
                    .get(dep.as_str())
                    .map(|rx| (dep.clone(), rx.clone()))
            })
            .collect();

        nodes.push(ExecNode {
            name: name.clone(),
            work: Arc::clone(&entry.work),
            state: entry.state.share(),
            deps,
            done,
        });
    }

    nodes
}

/// Run the `selected` tasks with maximum concurrency.
///
/// Returns the first failure observed (in arrival order). A task never
/// starts once the run's context is cancelled.
pub async fn run_concurrent(
    registry: &Registry,
    selected: &BTreeSet<TaskName>,
    hooks: &RunHooks,
    ctx: &TaskContext,
) -> Result<(), RunnerError> {
    info!(tasks = selected.len(), "starting concurrent run");
    ctx.err()?;

    let run_ctx = ctx.child();
    let mut set = JoinSet::new();
    let mut spawned: HashMap<tokio::task::Id, TaskName> = HashMap::new();

    for node in build_nodes(registry, selected) {
        let name = node.name.clone();
        let handle = set.spawn(node.run(hooks.clone(), run_ctx.clone()));
        spawned.insert(handle.id(), name);
    }

    let mut first_err: Option<RunnerError> = None;

    while let Some(joined) = set.join_next_with_id().await {
        let (name, result) = match joined {
            Ok((_, report)) => (report.name, report.result),
            Err(join_err) => {
                // Panics in the work are caught by the memoized run; this is
                // a hook panicking around it.
                let name = spawned.get(&join_err.id()).cloned().unwrap_or_default();
                let err = RunnerError::task(anyhow::anyhow!("task '{name}' panicked: {join_err}"));
                (name, Err(err))
            }
        };

        if let Err(err) = result {
            if first_err.is_none() {
                warn!(
                    task = %name,
                    error = %err,
                    "first failure in concurrent run; cancelling remaining tasks"
                );
                run_ctx.cancel();
                first_err = Some(err);
            } else {
                debug!(task = %name, error = %err, "additional failure in concurrent run");
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => {
            debug!("concurrent run finished");
            Ok(())
        }
    }
}
