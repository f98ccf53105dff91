// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`context`] defines the cancellation-aware [`TaskContext`].
//! - [`work`] defines the [`Work`] trait every task body implements.
//! - [`memo`] runs a single task at most once and drives the optional
//!   [`RunHooks`].
//! - [`sequential`] and [`concurrent`] walk the selected part of the graph.
//! - [`command`] provides [`ShellCommand`], the work type the CLI registers.

pub mod command;
pub mod concurrent;
pub mod context;
pub mod memo;
pub mod sequential;
pub mod work;

pub use command::{CommandCancelled, ShellCommand};
pub use concurrent::run_concurrent;
pub use context::TaskContext;
pub use memo::{RunHooks, run_memoized};
pub use sequential::run_sequential;
pub use work::{Work, WorkFuture};
