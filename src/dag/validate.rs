// src/dag/validate.rs

//! Graph validation: dangling dependencies, cycles and topological layering.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dag::registry::Registry;
use crate::engine::TaskName;
use crate::errors::RunnerError;

/// Topological layers in removal order.
///
/// Kahn's algorithm here removes tasks nobody depends on first, so the first
/// layer holds the "top" of the graph and the last layer holds the leaves.
/// Members of a layer never depend on each other and are sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layering {
    layers: Vec<Vec<TaskName>>,
}

impl Layering {
    /// Layers as removed: dependents first.
    pub fn layers(&self) -> &[Vec<TaskName>] {
        &self.layers
    }

    /// Tasks in an order where every dependency comes before its dependents.
    pub fn dependencies_first(&self) -> impl Iterator<Item = &TaskName> {
        self.layers.iter().rev().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Validate the registry and compute its layering.
pub fn validate_graph(registry: &Registry) -> Result<Layering, RunnerError> {
    check_missing_dependencies(registry)?;
    build_layering(registry)
}

/// Every declared dependency must itself be a registered task.
fn check_missing_dependencies(registry: &Registry) -> Result<(), RunnerError> {
    for (name, entry) in registry.iter() {
        for dep in entry.deps.iter() {
            if !registry.contains(dep) {
                debug!(task = %name, dep = %dep, "dependency is not registered");
                return Err(RunnerError::MissingDependency(dep.clone()));
            }
        }
    }
    Ok(())
}

/// Kahn's algorithm over "how many tasks name me as a dependency".
///
/// Removing a task decrements the count of each of its own dependencies.
/// Anything left once no zero-count task remains sits on a cycle (or behind
/// one).
fn build_layering(registry: &Registry) -> Result<Layering, RunnerError> {
    let mut in_degree: BTreeMap<&str, usize> = registry.names().map(|name| (name, 0)).collect();

    for (_, entry) in registry.iter() {
        for dep in entry.deps.iter() {
            if let Some(count) = in_degree.get_mut(dep.as_str()) {
                *count += 1;
            }
        }
    }

    let mut layers = Vec::new();
    loop {
        let layer: Vec<&str> = in_degree
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| *name)
            .collect();

        if layer.is_empty() {
            break;
        }

        for name in layer.iter() {
            in_degree.remove(name);
            for dep in registry.dependencies_of(name) {
                if let Some(count) = in_degree.get_mut(dep.as_str()) {
                    *count = count.saturating_sub(1);
                }
            }
        }

        layers.push(layer.into_iter().map(str::to_string).collect());
    }

    if !in_degree.is_empty() {
        debug!(
            remaining = in_degree.len(),
            "tasks left after layering; graph has a cycle"
        );
        return Err(RunnerError::Cyclic);
    }

    Ok(Layering { layers })
}
