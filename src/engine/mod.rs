// src/engine/mod.rs

//! The dependency runner.
//!
//! [`Runner`] owns the task registry and the cached validation result, and
//! dispatches runs to the sequential or concurrent executor in
//! [`crate::exec`].

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

pub mod runner;

pub use runner::Runner;
