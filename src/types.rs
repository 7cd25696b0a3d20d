use std::fmt;

use serde::Deserialize;

/// Canonical package name type used throughout the crate.
pub type PackageName = String;

/// Kind of a dependency edge between two workspace packages.
///
/// Only `Prod` edges propagate dirtiness to dependents; all kinds gate the
/// build frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Prod,
    Dev,
    Peer,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 3] =
        [DependencyKind::Prod, DependencyKind::Dev, DependencyKind::Peer];

    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Prod => "prod",
            DependencyKind::Dev => "dev",
            DependencyKind::Peer => "peer",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Edge {
        kind: DependencyKind,
    }

    #[test]
    fn kinds_deserialize_from_lowercase_names() {
        for kind in DependencyKind::ALL {
            let edge: Edge = toml::from_str(&format!("kind = \"{kind}\"")).unwrap();
            assert_eq!(edge.kind, kind);
        }
        assert!(toml::from_str::<Edge>("kind = \"optional\"").is_err());
    }
}
