// src/exec/work.rs

//! The unit-of-work abstraction the runner schedules.
//!
//! The runner never looks inside a unit of work: it hands it a
//! [`TaskContext`] and waits for success or failure. Anything that decorates
//! a single unit of work (retries, timeouts, caching) is expected to be
//! applied before the work is registered.

use std::future::Future;
use std::pin::Pin;

use super::context::TaskContext;

/// Boxed future returned by [`Work::run`].
pub type WorkFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// A unit of work.
///
/// Closures of the shape `Fn(TaskContext) -> impl Future<Output = anyhow::Result<()>>`
/// implement this trait, so most callers never implement it by hand:
///
/// ```no_run
/// use deptask::{Runner, TaskContext};
///
/// let mut runner = Runner::new();
/// runner.must_add("hello", |_ctx: TaskContext| async { anyhow::Ok(()) }, &[]);
/// ```
pub trait Work: Send + Sync {
    /// Start one invocation of the work.
    ///
    /// The returned future must not borrow `self`, since the runner may
    /// spawn it onto another Tokio task.
    fn run(&self, ctx: TaskContext) -> WorkFuture;
}

impl<F, Fut> Work for F
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn run(&self, ctx: TaskContext) -> WorkFuture {
        Box::pin(self(ctx))
    }
}
