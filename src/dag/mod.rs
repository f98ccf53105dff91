// src/dag/mod.rs

//! Task graph storage and analysis.
//!
//! - [`registry`] stores every task with its dependencies and execution state.
//! - [`validate`] checks for missing dependencies and cycles and computes the
//!   topological layering.
//! - [`walker`] computes transitive dependency closures for partial runs.
//! - [`diagnostics`] names the tasks involved in cycles.

pub mod diagnostics;
pub mod registry;
pub mod validate;
pub mod walker;

pub use diagnostics::cyclic_tasks;
pub use registry::{ExecState, Registry, StateCell, TaskEntry, TaskStatus};
pub use validate::{Layering, validate_graph};
pub use walker::{applicable_tasks, list_deps};
