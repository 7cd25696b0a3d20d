#![allow(dead_code)]

use std::collections::BTreeSet;

use applink::graph::{DependencyEdge, DependencyGraph};
use applink::types::DependencyKind;

/// Builder for `DependencyGraph` to simplify test setup.
///
/// `depends(a, b)` reads "a depends on b".
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: BTreeSet<String>,
    edges: Vec<DependencyEdge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(mut self, name: &str) -> Self {
        self.nodes.insert(name.to_string());
        self
    }

    pub fn depends(self, from: &str, to: &str) -> Self {
        self.edge(from, to, DependencyKind::Prod)
    }

    pub fn dev_depends(self, from: &str, to: &str) -> Self {
        self.edge(from, to, DependencyKind::Dev)
    }

    pub fn peer_depends(self, from: &str, to: &str) -> Self {
        self.edge(from, to, DependencyKind::Peer)
    }

    pub fn edge(mut self, from: &str, to: &str, kind: DependencyKind) -> Self {
        self.nodes.insert(from.to_string());
        self.nodes.insert(to.to_string());
        self.edges.push(DependencyEdge::new(from, to, kind));
        self
    }

    /// Panics if the edges form a cycle; use `try_build` to test that.
    pub fn build(self) -> DependencyGraph {
        self.try_build().expect("test graph must be acyclic")
    }

    pub fn try_build(self) -> applink::errors::Result<DependencyGraph> {
        DependencyGraph::new(self.nodes, self.edges)
    }
}

/// `a -> b -> c` where `c` depends on nothing.
pub fn chain_abc() -> DependencyGraph {
    GraphBuilder::new().depends("A", "B").depends("B", "C").build()
}

/// A trimmed-down snapshot of a real SDK workspace, with prod, dev and peer
/// edges. The mock backend dev-depends on the reference workspace, and
/// `sdk-ui` dev-depends on both.
pub fn sdk_workspace() -> DependencyGraph {
    GraphBuilder::new()
        .depends("sdk-model", "util")
        .depends("sdk-backend-spi", "sdk-model")
        .depends("sdk-backend-base", "sdk-backend-spi")
        .depends("sdk-backend-base", "sdk-model")
        .depends("sdk-ui", "sdk-backend-spi")
        .depends("sdk-ui", "sdk-model")
        .depends("sdk-ui", "util")
        .depends("sdk-ui-kit", "sdk-ui")
        .depends("sdk-ui-kit", "util")
        .depends("sdk-ui-vis-commons", "sdk-ui")
        .depends("sdk-ui-charts", "sdk-ui")
        .depends("sdk-ui-charts", "sdk-ui-vis-commons")
        .depends("sdk-ui-pivot", "sdk-ui")
        .depends("sdk-ui-filters", "sdk-ui-kit")
        .depends("sdk-ui-all", "sdk-ui-charts")
        .depends("sdk-ui-all", "sdk-ui-pivot")
        .depends("sdk-ui-all", "sdk-ui-filters")
        .depends("sdk-backend-mockingbird", "sdk-backend-base")
        .depends("reference-workspace", "sdk-model")
        .dev_depends("sdk-ui", "reference-workspace")
        .dev_depends("sdk-ui", "sdk-backend-mockingbird")
        .dev_depends("sdk-backend-mockingbird", "reference-workspace")
        .peer_depends("sdk-ui-charts", "sdk-ui-kit")
        .build()
}

/// Builder for `Applink.toml` manifest text.
///
/// Packages get `dir = "<name>"` unless set otherwise.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    debounce_ms: Option<u64>,
    default_build: Option<String>,
    exclude: Vec<String>,
    independent: Vec<String>,
    packages: Vec<PackageEntry>,
}

#[derive(Debug)]
struct PackageEntry {
    name: String,
    dir: String,
    build: Option<String>,
    deps: Vec<String>,
    dev_deps: Vec<String>,
    peer_deps: Vec<String>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = Some(ms);
        self
    }

    pub fn default_build(mut self, cmd: &str) -> Self {
        self.default_build = Some(cmd.to_string());
        self
    }

    pub fn exclude(mut self, glob: &str) -> Self {
        self.exclude.push(glob.to_string());
        self
    }

    pub fn independent(mut self, glob: &str) -> Self {
        self.independent.push(glob.to_string());
        self
    }

    pub fn package(mut self, name: &str) -> Self {
        self.packages.push(PackageEntry {
            name: name.to_string(),
            dir: name.to_string(),
            build: None,
            deps: Vec::new(),
            dev_deps: Vec::new(),
            peer_deps: Vec::new(),
        });
        self
    }

    pub fn dir(self, dir: &str) -> Self {
        self.with_last(|p| p.dir = dir.to_string())
    }

    pub fn build(self, cmd: &str) -> Self {
        self.with_last(|p| p.build = Some(cmd.to_string()))
    }

    pub fn deps(self, deps: &[&str]) -> Self {
        self.with_last(|p| p.deps.extend(deps.iter().map(|d| d.to_string())))
    }

    pub fn dev_deps(self, deps: &[&str]) -> Self {
        self.with_last(|p| p.dev_deps.extend(deps.iter().map(|d| d.to_string())))
    }

    pub fn peer_deps(self, deps: &[&str]) -> Self {
        self.with_last(|p| p.peer_deps.extend(deps.iter().map(|d| d.to_string())))
    }

    fn with_last(mut self, f: impl FnOnce(&mut PackageEntry)) -> Self {
        let last = self
            .packages
            .last_mut()
            .expect("call package() before setting package fields");
        f(last);
        self
    }

    pub fn to_toml(&self) -> String {
        let mut out = String::new();

        if let Some(ms) = self.debounce_ms {
            out.push_str(&format!("[config]\ndebounce_ms = {ms}\n\n"));
        }

        out.push_str("[default]\n");
        if let Some(build) = &self.default_build {
            out.push_str(&format!("build = {}\n", quote(build)));
        }
        out.push_str(&format!("exclude = {}\n", list(&self.exclude)));
        out.push_str(&format!("independent = {}\n\n", list(&self.independent)));

        for p in &self.packages {
            out.push_str(&format!("[package.{}]\n", quote(&p.name)));
            out.push_str(&format!("dir = {}\n", quote(&p.dir)));
            if let Some(build) = &p.build {
                out.push_str(&format!("build = {}\n", quote(build)));
            }
            out.push_str(&format!("deps = {}\n", list(&p.deps)));
            out.push_str(&format!("dev_deps = {}\n", list(&p.dev_deps)));
            out.push_str(&format!("peer_deps = {}\n\n", list(&p.peer_deps)));
        }

        out
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
    format!("[{}]", quoted.join(", "))
}
