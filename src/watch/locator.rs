// src/watch/locator.rs

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::WorkspaceConfig;
use crate::errors::{ApplinkError, Result};
use crate::types::PackageName;
use crate::watch::path_utils::{normalize_dir, relative_str};

/// A changed file attributed to a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub package_name: PackageName,
    /// Path relative to the package directory.
    pub path: String,
    /// Matches one of the `independent` globs.
    pub independent: bool,
}

/// Maps changed paths to the package that owns them.
///
/// Ownership is decided by the longest package directory that prefixes the
/// path, so nested packages win over their parents. `exclude` and
/// `independent` globs are matched against the path relative to the owning
/// package directory.
#[derive(Debug, Clone)]
pub struct PackageLocator {
    root: PathBuf,
    /// `(normalized dir, package)`, longest dir first.
    dirs: Vec<(String, PackageName)>,
    exclude: GlobSet,
    independent: GlobSet,
}

impl PackageLocator {
    pub fn new<I>(
        root: impl Into<PathBuf>,
        packages: I,
        exclude: &[String],
        independent: &[String],
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (PackageName, String)>,
    {
        let mut dirs: Vec<(String, PackageName)> = packages
            .into_iter()
            .map(|(name, dir)| (normalize_dir(&dir), name))
            .collect();
        dirs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            root: root.into(),
            dirs,
            exclude: build_globset(exclude)?,
            independent: build_globset(independent)?,
        })
    }

    /// Locator for every package in a validated manifest.
    pub fn from_config(cfg: &WorkspaceConfig, root: impl Into<PathBuf>) -> Result<Self> {
        let packages = cfg
            .package
            .iter()
            .map(|(name, pkg)| (name.clone(), pkg.dir.clone()));
        Self::new(root, packages, &cfg.default.exclude, &cfg.default.independent)
    }

    /// Keep only the given packages (e.g. the selected target's scope).
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.dirs.retain(|(_, name)| keep(name));
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute directories of every located package.
    pub fn package_dirs(&self) -> Vec<PathBuf> {
        self.dirs.iter().map(|(dir, _)| self.root.join(dir)).collect()
    }

    /// Attribute `path` to a package, or `None` if it is outside every
    /// package directory or excluded.
    pub fn locate(&self, path: &Path) -> Option<FileChange> {
        let rel = relative_str(&self.root, path)?;

        let (dir, name) = self.dirs.iter().find(|(dir, _)| {
            dir.is_empty()
                || rel == *dir
                || (rel.starts_with(dir.as_str()) && rel[dir.len()..].starts_with('/'))
        })?;

        let in_package = rel[dir.len()..].trim_start_matches('/').to_string();
        if in_package.is_empty() || self.exclude.is_match(&in_package) {
            return None;
        }

        Some(FileChange {
            package_name: name.clone(),
            independent: self.independent.is_match(&in_package),
            path: in_package,
        })
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            ApplinkError::ConfigError(format!("invalid glob pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ApplinkError::ConfigError(format!("building glob set: {}", e)))
}
