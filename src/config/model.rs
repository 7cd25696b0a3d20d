// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{DependencyKind, PackageName};

/// Workspace manifest exactly as read from TOML, before validation.
///
/// ```toml
/// [config]
/// debounce_ms = 200
///
/// [default]
/// build = "npm run build"
/// exclude = ["**/node_modules/**", "**/dist/**"]
/// independent = ["**/*.test.ts"]
///
/// [package."@acme/ui"]
/// dir = "libs/ui"
/// deps = ["@acme/model"]
/// dev_deps = ["@acme/mocks"]
/// ```
///
/// All sections except `package` are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkspaceConfig {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub default: DefaultSection,

    /// Keys are package names (e.g. `"@acme/ui"`).
    #[serde(default)]
    pub package: BTreeMap<PackageName, PackageConfig>,
}

/// Validated workspace manifest.
///
/// Only obtainable through `TryFrom<RawWorkspaceConfig>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    pub config: ConfigSection,
    pub default: DefaultSection,
    pub package: BTreeMap<PackageName, PackageConfig>,
}

impl WorkspaceConfig {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        default: DefaultSection,
        package: BTreeMap<PackageName, PackageConfig>,
    ) -> Self {
        Self {
            config,
            default,
            package,
        }
    }

    /// Build command for a package, falling back to `[default].build`.
    pub fn build_command(&self, name: &str) -> Option<&str> {
        let pkg = self.package.get(name)?;
        pkg.build.as_deref().or(self.default.build.as_deref())
    }

    /// Package directory resolved against the manifest's root directory.
    pub fn package_dir(&self, root: &Path, name: &str) -> Option<PathBuf> {
        self.package.get(name).map(|pkg| root.join(&pkg.dir))
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Window (milliseconds) over which file changes are batched into one
    /// `PackagesChanged` event.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    200
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[default]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultSection {
    /// Build command used by packages that do not set their own.
    #[serde(default)]
    pub build: Option<String>,

    /// Globs (relative to a package dir) whose changes are ignored entirely.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Globs (relative to a package dir) whose changes do not affect
    /// dependents, e.g. tests or stories.
    #[serde(default)]
    pub independent: Vec<String>,
}

/// `[package.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageConfig {
    /// Package directory, relative to the manifest.
    pub dir: String,

    /// Optional build command override.
    #[serde(default)]
    pub build: Option<String>,

    /// Production dependencies.
    #[serde(default)]
    pub deps: Vec<PackageName>,

    /// Development dependencies.
    #[serde(default)]
    pub dev_deps: Vec<PackageName>,

    /// Peer dependencies.
    #[serde(default)]
    pub peer_deps: Vec<PackageName>,
}

impl PackageConfig {
    /// All declared dependency edges of this package, tagged by kind.
    pub fn edges(&self) -> impl Iterator<Item = (&PackageName, DependencyKind)> {
        let prod = self.deps.iter().map(|d| (d, DependencyKind::Prod));
        let dev = self.dev_deps.iter().map(|d| (d, DependencyKind::Dev));
        let peer = self.peer_deps.iter().map(|d| (d, DependencyKind::Peer));
        prod.chain(dev).chain(peer)
    }
}
