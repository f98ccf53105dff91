// src/exec/memo.rs

//! Memoized execution of a single task, shared by both executors.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::dag::{ExecState, StateCell};
use crate::errors::RunnerError;

use super::context::TaskContext;
use super::work::Work;

type PreHook = Arc<dyn Fn(&str) + Send + Sync>;
type PostHook = Arc<dyn Fn(&str, bool, Option<&RunnerError>) + Send + Sync>;

/// Optional observers around each memoized run.
///
/// - `on_start(name)` is called right before a unit of work is invoked.
/// - `on_finish(name, skipped, error)` is called after an invocation, and
///   every time a skipped task is reached.
///
/// Neither hook is called for a task that had already been executed by an
/// earlier run.
#[derive(Clone, Default)]
pub struct RunHooks {
    pre: Option<PreHook>,
    post: Option<PostHook>,
}

impl RunHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.pre = Some(Arc::new(hook));
        self
    }

    pub fn on_finish(
        mut self,
        hook: impl Fn(&str, bool, Option<&RunnerError>) + Send + Sync + 'static,
    ) -> Self {
        self.post = Some(Arc::new(hook));
        self
    }

    fn started(&self, name: &str) {
        if let Some(pre) = &self.pre {
            pre(name);
        }
    }

    fn finished(&self, name: &str, skipped: bool, err: Option<&RunnerError>) {
        if let Some(post) = &self.post {
            post(name, skipped, err);
        }
    }
}

impl fmt::Debug for RunHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHooks")
            .field("on_start", &self.pre.is_some())
            .field("on_finish", &self.post.is_some())
            .finish()
    }
}

/// Run a task at most once.
///
/// - `Executed`: return the stored result without invoking the work again.
/// - `Skipped`: succeed without invoking the work.
/// - `Pending`: claim the task, invoke the work, store its result and move
///   to `Executed`. A panic in the work is stored as the task's failure.
pub async fn run_memoized(
    name: &str,
    work: &Arc<dyn Work>,
    state: &StateCell,
    hooks: &RunHooks,
    ctx: &TaskContext,
) -> Result<(), RunnerError> {
    match state.claim(name) {
        ExecState::Executed(err) => {
            debug!(task = %name, failed = err.is_some(), "task already executed; reusing result");
            err.map_or(Ok(()), Err)
        }
        ExecState::Skipped => {
            debug!(task = %name, "task is skipped; treating as success");
            hooks.finished(name, true, None);
            Ok(())
        }
        ExecState::Pending => {
            hooks.started(name);
            info!(task = %name, "starting task");

            let result = invoke(name, work, ctx.clone()).await;

            match &result {
                Ok(()) => info!(task = %name, "task finished"),
                Err(err) => warn!(task = %name, error = %err, "task failed"),
            }

            state.set(ExecState::Executed(result.clone().err()));
            hooks.finished(name, false, result.as_ref().err());
            result
        }
    }
}

async fn invoke(name: &str, work: &Arc<dyn Work>, ctx: TaskContext) -> Result<(), RunnerError> {
    match AssertUnwindSafe(async { work.run(ctx).await })
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome.map_err(RunnerError::task),
        Err(payload) => Err(RunnerError::task(anyhow::anyhow!(
            "task '{name}' panicked: {}",
            panic_message(&*payload)
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
