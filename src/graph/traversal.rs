// src/graph/traversal.rs

//! Reachability queries over a [`DependencyGraph`].
//!
//! Both walks are iterative with a visited set, so a package reachable along
//! several paths is only expanded once.

use std::collections::{BTreeSet, HashSet};

use crate::errors::{ApplinkError, Result};
use crate::graph::DependencyGraph;
use crate::types::{DependencyKind, PackageName};

impl DependencyGraph {
    /// Every package that depends, directly or transitively, on any of
    /// `changed`, following only edges of the given `kinds`.
    ///
    /// The changed packages themselves are only part of the result if one of
    /// them is reachable as a dependent of another.
    pub fn transitive_dependents<I, S>(
        &self,
        changed: I,
        kinds: &[DependencyKind],
    ) -> Result<BTreeSet<PackageName>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stack: Vec<&str> = Vec::new();
        for name in changed {
            let name = name.as_ref();
            for dep in self.dependents_of(name)? {
                if kinds.contains(&dep.kind) {
                    stack.push(dep.name.as_str());
                }
            }
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut result = BTreeSet::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name) {
                continue;
            }
            result.insert(name.to_string());

            for dep in self.dependents_of(name)? {
                if kinds.contains(&dep.kind) && !visited.contains(dep.name.as_str()) {
                    stack.push(dep.name.as_str());
                }
            }
        }

        Ok(result)
    }

    /// The `target` package plus everything it transitively depends on over
    /// edges of the given `kinds`.
    pub fn dependency_closure(
        &self,
        target: &str,
        kinds: &[DependencyKind],
    ) -> Result<BTreeSet<PackageName>> {
        if !self.contains(target) {
            return Err(ApplinkError::UnknownPackage(target.to_string()));
        }

        let mut stack = vec![target];
        let mut closure = BTreeSet::new();

        while let Some(name) = stack.pop() {
            if !closure.insert(name.to_string()) {
                continue;
            }
            for dep in self.dependencies_of(name)? {
                if kinds.contains(&dep.kind) {
                    stack.push(dep.name.as_str());
                }
            }
        }

        Ok(closure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyEdge;

    const PROD: &[DependencyKind] = &[DependencyKind::Prod];

    fn chain_with_dev_edge() -> DependencyGraph {
        // a -> b -> c (prod), d -(dev)-> c, a -(dev)-> d.
        DependencyGraph::new(
            ["a", "b", "c", "d", "lonely"],
            [
                DependencyEdge::new("a", "b", DependencyKind::Prod),
                DependencyEdge::new("b", "c", DependencyKind::Prod),
                DependencyEdge::new("d", "c", DependencyKind::Dev),
                DependencyEdge::new("a", "d", DependencyKind::Dev),
            ],
        )
        .unwrap()
    }

    #[test]
    fn dependents_follow_only_requested_kinds() {
        let g = chain_with_dev_edge();
        let deps = g.transitive_dependents(["c"], PROD).unwrap();
        assert_eq!(deps, BTreeSet::from(["a".to_string(), "b".to_string()]));

        let none = g.transitive_dependents(["a"], PROD).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn dependents_over_all_kinds_visit_each_package_once() {
        let g = chain_with_dev_edge();
        // `a` is reachable from `c` via both `b` and `d`.
        let all = g
            .transitive_dependents(["c"], &DependencyKind::ALL)
            .unwrap();
        assert_eq!(
            all,
            BTreeSet::from(["a".to_string(), "b".to_string(), "d".to_string()])
        );
    }

    #[test]
    fn dependents_of_unknown_package_fail_loudly() {
        let err = chain_with_dev_edge()
            .transitive_dependents(["c", "ghost"], PROD)
            .unwrap_err();
        assert!(matches!(err, ApplinkError::UnknownPackage(name) if name == "ghost"));
    }

    #[test]
    fn closure_contains_target_and_its_dependencies() {
        let g = chain_with_dev_edge();
        assert_eq!(
            g.dependency_closure("b", PROD).unwrap(),
            BTreeSet::from(["b".to_string(), "c".to_string()])
        );
        assert_eq!(
            g.dependency_closure("lonely", PROD).unwrap(),
            BTreeSet::from(["lonely".to_string()])
        );
        assert!(g.dependency_closure("ghost", PROD).is_err());
    }
}
