// src/scheduler/frontier.rs

use std::collections::BTreeMap;

use crate::errors::{ApplinkError, Result};
use crate::graph::DependencyGraph;
use crate::scheduler::package_state::PackageState;
use crate::types::PackageName;

/// Dirty packages that can be built right now.
///
/// A package qualifies when it is dirty, not already requested or running,
/// and every direct dependency (any kind) is clean. Packages without
/// dependencies qualify trivially. The result is sorted by name; callers must
/// not read anything into that order.
///
/// `graph` must be the graph the `states` table was seeded from: a dependency
/// missing from `states` is reported as [`ApplinkError::UnknownPackage`].
pub fn dirty_frontier(
    graph: &DependencyGraph,
    states: &BTreeMap<PackageName, PackageState>,
) -> Result<Vec<PackageName>> {
    let mut frontier = Vec::new();

    for (name, state) in states.iter() {
        if !state.is_candidate() {
            continue;
        }

        let mut ready = true;
        for dep in graph.dependencies_of(name)? {
            let dep_state = states.get(&dep.name).ok_or_else(|| {
                ApplinkError::UnknownPackage(format!(
                    "{} (dependency of {}) has no scheduler state",
                    dep.name, name
                ))
            })?;
            if !dep_state.is_clean() {
                ready = false;
                break;
            }
        }

        if ready {
            frontier.push(name.clone());
        }
    }

    Ok(frontier)
}
