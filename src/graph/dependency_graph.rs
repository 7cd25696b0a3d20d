// src/graph/dependency_graph.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::WorkspaceConfig;
use crate::errors::{ApplinkError, Result};
use crate::types::{DependencyKind, PackageName};

/// A directed, typed edge: `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyEdge {
    pub from: PackageName,
    pub to: PackageName,
    pub kind: DependencyKind,
}

impl DependencyEdge {
    pub fn new(
        from: impl Into<PackageName>,
        to: impl Into<PackageName>,
        kind: DependencyKind,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

/// One end of an edge as seen from a node: the other package plus the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: PackageName,
    pub kind: DependencyKind,
}

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PackageNode {
    /// Packages this one depends on.
    deps: Vec<Dependency>,
    /// Packages that depend on this one.
    dependents: Vec<Dependency>,
}

/// Immutable in-memory dependency graph keyed by package name.
///
/// Node iteration order is sorted by name so that everything derived from the
/// graph (frontiers, dry-run output, logs) is deterministic.
///
/// The graph is acyclic over every edge kind, since every kind gates the
/// build frontier. [`DependencyGraph::new`] enforces this and
/// `config::validate` does the same for manifests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: BTreeMap<PackageName, PackageNode>,
}

impl DependencyGraph {
    /// Build a graph from explicit nodes and edges.
    ///
    /// Fails with [`ApplinkError::UnknownPackage`] if an edge refers to a node
    /// that was not listed, and with [`ApplinkError::DependencyCycle`] if the
    /// edges (of any kind) form a cycle. Duplicate edges are collapsed.
    pub fn new<N, E>(nodes: N, edges: E) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: Into<PackageName>,
        E: IntoIterator<Item = DependencyEdge>,
    {
        let mut graph = Self {
            nodes: nodes
                .into_iter()
                .map(|n| (n.into(), PackageNode::default()))
                .collect(),
        };

        let edges: BTreeSet<DependencyEdge> = edges.into_iter().collect();
        for edge in edges {
            for end in [&edge.from, &edge.to] {
                if !graph.nodes.contains_key(end) {
                    return Err(ApplinkError::UnknownPackage(format!(
                        "edge {} -> {} ({}) references '{}' which is not a graph node",
                        edge.from, edge.to, edge.kind, end
                    )));
                }
            }
            graph.link(edge);
        }

        graph.ensure_acyclic()?;
        Ok(graph)
    }

    /// Build a graph from a validated [`WorkspaceConfig`].
    ///
    /// Assumes every edge target exists; validation already guarantees that.
    pub fn from_config(cfg: &WorkspaceConfig) -> Self {
        let mut graph = Self {
            nodes: cfg
                .package
                .keys()
                .map(|name| (name.clone(), PackageNode::default()))
                .collect(),
        };

        let edges: BTreeSet<DependencyEdge> = cfg
            .package
            .iter()
            .flat_map(|(name, pkg)| {
                pkg.edges()
                    .map(move |(to, kind)| DependencyEdge::new(name.clone(), to.clone(), kind))
            })
            .collect();

        for edge in edges {
            if graph.nodes.contains_key(&edge.to) {
                graph.link(edge);
            }
        }

        graph
    }

    /// A package waiting on a dependency cycle could never be built.
    fn ensure_acyclic(&self) -> Result<()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (name, node) in self.nodes.iter() {
            graph.add_node(name.as_str());
            for dep in node.deps.iter() {
                graph.add_edge(dep.name.as_str(), name.as_str(), ());
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            ApplinkError::DependencyCycle(format!(
                "dependency graph has a cycle involving package '{}'",
                cycle.node_id()
            ))
        })
    }

    fn link(&mut self, edge: DependencyEdge) {
        if let Some(node) = self.nodes.get_mut(&edge.from) {
            node.deps.push(Dependency {
                name: edge.to.clone(),
                kind: edge.kind,
            });
        }
        if let Some(node) = self.nodes.get_mut(&edge.to) {
            node.dependents.push(Dependency {
                name: edge.from,
                kind: edge.kind,
            });
        }
    }

    /// All package names, sorted.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every edge in the graph, grouped by dependent package.
    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.nodes.iter().flat_map(|(from, node)| {
            node.deps
                .iter()
                .map(move |d| DependencyEdge::new(from.clone(), d.name.clone(), d.kind))
        })
    }

    /// Direct dependencies of a package (all kinds).
    pub fn dependencies_of(&self, name: &str) -> Result<&[Dependency]> {
        self.node(name).map(|n| n.deps.as_slice())
    }

    /// Direct dependents of a package (all kinds).
    pub fn dependents_of(&self, name: &str) -> Result<&[Dependency]> {
        self.node(name).map(|n| n.dependents.as_slice())
    }

    fn node(&self, name: &str) -> Result<&PackageNode> {
        self.nodes
            .get(name)
            .ok_or_else(|| ApplinkError::UnknownPackage(name.to_string()))
    }

    /// Subgraph containing only `names` and the edges between them.
    ///
    /// Every requested name must exist in this graph.
    pub fn restrict<I, S>(&self, names: I) -> Result<DependencyGraph>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keep = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(ApplinkError::UnknownPackage(name.to_string()));
            }
            keep.insert(name.to_string());
        }

        let nodes = keep
            .iter()
            .map(|name| {
                let node = &self.nodes[name];
                let filter = |list: &[Dependency]| {
                    list.iter()
                        .filter(|d| keep.contains(&d.name))
                        .cloned()
                        .collect::<Vec<_>>()
                };
                (
                    name.clone(),
                    PackageNode {
                        deps: filter(&node.deps),
                        dependents: filter(&node.dependents),
                    },
                )
            })
            .collect();

        Ok(DependencyGraph { nodes })
    }
}
