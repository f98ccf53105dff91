// src/dag/walker.rs

//! Transitive dependency closure.

use std::collections::{BTreeSet, HashSet};

use crate::dag::registry::Registry;
use crate::engine::TaskName;

/// List the transitive dependencies of `names`, or every registered task if
/// `names` is empty.
///
/// Requested names are only part of the result when another requested name
/// (transitively) depends on them. Unknown names contribute nothing. The walk
/// uses an explicit stack, so deep graphs don't grow the call stack, and a
/// visited set, so it terminates even on a graph that was never validated.
pub fn list_deps(registry: &Registry, names: &[&str]) -> Vec<TaskName> {
    if names.is_empty() {
        return registry.names().map(str::to_string).collect();
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut found = Vec::new();

    for root in names {
        let mut stack: Vec<&str> = registry
            .dependencies_of(root)
            .iter()
            .map(String::as_str)
            .collect();

        while let Some(name) = stack.pop() {
            if !visited.insert(name) {
                continue;
            }
            found.push(name.to_string());

            for dep in registry.dependencies_of(name) {
                if !visited.contains(dep.as_str()) {
                    stack.push(dep.as_str());
                }
            }
        }
    }

    found
}

/// The set of tasks a partial run touches: the closure of `names` plus the
/// requested names that are actually registered. Empty `names` selects
/// everything.
pub fn applicable_tasks(registry: &Registry, names: &[&str]) -> BTreeSet<TaskName> {
    let mut selected: BTreeSet<TaskName> = list_deps(registry, names).into_iter().collect();
    selected.extend(
        names
            .iter()
            .filter(|name| registry.contains(name))
            .map(|name| name.to_string()),
    );
    selected
}
