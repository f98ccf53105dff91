// src/exec/context.rs

//! Cancellation-aware execution context handed to every unit of work.

use tokio_util::sync::CancellationToken;

use crate::errors::RunnerError;

/// Execution context for a run.
///
/// Cloning is cheap and every clone observes the same cancellation state.
/// Cancellation is cooperative: the runner only forwards the signal, a unit
/// of work has to watch [`TaskContext::cancelled`] (or poll
/// [`TaskContext::is_cancelled`]) to stop early.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    token: CancellationToken,
}

impl TaskContext {
    /// A fresh, never-cancelled root context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context that is cancelled together with `self`, but whose
    /// own cancellation does not propagate back up.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once this context has been cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// `Err(RunnerError::Cancelled)` if this context has been cancelled.
    pub fn err(&self) -> Result<(), RunnerError> {
        if self.token.is_cancelled() {
            Err(RunnerError::Cancelled)
        } else {
            Ok(())
        }
    }
}
