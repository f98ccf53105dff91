// src/dag/diagnostics.rs

//! Extra detail for cyclic graphs.
//!
//! `Runner::validate` only reports *that* a cycle exists. When a caller wants
//! to know which tasks are involved (the CLI prints them), this module builds
//! a petgraph view of the registry and extracts the cyclic strongly connected
//! components.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::dag::registry::Registry;
use crate::engine::TaskName;

/// Groups of tasks that form cycles, each group sorted by name.
///
/// A group is either a strongly connected component with more than one task,
/// or a single task that lists itself as a dependency. Dependencies that are
/// not registered are ignored. Returns an empty vector for an acyclic graph.
pub fn cyclic_tasks(registry: &Registry) -> Vec<Vec<TaskName>> {
    // Edge direction: dep -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in registry.names() {
        graph.add_node(name);
    }

    for (name, entry) in registry.iter() {
        for dep in entry.deps.iter() {
            if registry.contains(dep) {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }
    }

    let mut cycles: Vec<Vec<TaskName>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.contains_edge(component[0], component[0])
        })
        .map(|component| {
            let mut names: Vec<TaskName> = component.into_iter().map(str::to_string).collect();
            names.sort();
            names
        })
        .collect();

    cycles.sort();
    cycles
}
