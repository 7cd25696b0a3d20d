// src/graph/mod.rs

//! Workspace dependency graph.
//!
//! - [`dependency_graph`] holds the immutable package graph with typed edges,
//!   plus restriction to a package subset.
//! - [`traversal`] contains the reachability queries the scheduler needs
//!   (transitive dependents, dependency closure of a target).

pub mod dependency_graph;
pub mod traversal;

pub use dependency_graph::{Dependency, DependencyEdge, DependencyGraph};
