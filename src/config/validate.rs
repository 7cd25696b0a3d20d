// src/config/validate.rs

use std::collections::HashMap;

use globset::Glob;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{RawWorkspaceConfig, WorkspaceConfig};
use crate::errors::{ApplinkError, Result};
use crate::types::DependencyKind;

impl TryFrom<RawWorkspaceConfig> for WorkspaceConfig {
    type Error = ApplinkError;

    fn try_from(raw: RawWorkspaceConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(WorkspaceConfig::new_unchecked(raw.config, raw.default, raw.package))
    }
}

fn validate_raw_config(cfg: &RawWorkspaceConfig) -> Result<()> {
    ensure_has_packages(cfg)?;
    validate_global_config(cfg)?;
    validate_package_dirs(cfg)?;
    validate_build_commands(cfg)?;
    validate_dependencies(cfg)?;
    validate_globs(cfg)?;
    validate_acyclic(cfg)?;
    Ok(())
}

fn ensure_has_packages(cfg: &RawWorkspaceConfig) -> Result<()> {
    if cfg.package.is_empty() {
        return Err(ApplinkError::ConfigError(
            "manifest must contain at least one [package.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawWorkspaceConfig) -> Result<()> {
    if cfg.config.debounce_ms == 0 {
        return Err(ApplinkError::ConfigError(
            "[config].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_package_dirs(cfg: &RawWorkspaceConfig) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (name, pkg) in cfg.package.iter() {
        let dir = pkg.dir.trim_end_matches('/');
        if dir.is_empty() {
            return Err(ApplinkError::ConfigError(format!(
                "package '{}' has an empty `dir`",
                name
            )));
        }
        if let Some(other) = seen.insert(dir, name.as_str()) {
            return Err(ApplinkError::ConfigError(format!(
                "packages '{}' and '{}' share the directory '{}'",
                other, name, dir
            )));
        }
    }
    Ok(())
}

fn validate_build_commands(cfg: &RawWorkspaceConfig) -> Result<()> {
    if cfg.default.build.is_some() {
        return Ok(());
    }
    for (name, pkg) in cfg.package.iter() {
        if pkg.build.is_none() {
            return Err(ApplinkError::ConfigError(format!(
                "package '{}' has no `build` command and [default].build is not set",
                name
            )));
        }
    }
    Ok(())
}

fn validate_dependencies(cfg: &RawWorkspaceConfig) -> Result<()> {
    for (name, pkg) in cfg.package.iter() {
        for (dep, kind) in pkg.edges() {
            if !cfg.package.contains_key(dep) {
                return Err(ApplinkError::ConfigError(format!(
                    "package '{}' has unknown {} dependency '{}'",
                    name, kind, dep
                )));
            }
            if dep == name {
                return Err(ApplinkError::ConfigError(format!(
                    "package '{}' cannot depend on itself",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_globs(cfg: &RawWorkspaceConfig) -> Result<()> {
    for pattern in cfg.default.exclude.iter().chain(cfg.default.independent.iter()) {
        Glob::new(pattern).map_err(|e| {
            ApplinkError::ConfigError(format!("invalid glob pattern '{}': {}", pattern, e))
        })?;
    }
    Ok(())
}

/// The frontier waits on dependencies of every kind, so no kind may form a
/// cycle.
fn validate_acyclic(cfg: &RawWorkspaceConfig) -> Result<()> {
    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, DependencyKind> = DiGraphMap::new();

    for name in cfg.package.keys() {
        graph.add_node(name.as_str());
    }

    for (name, pkg) in cfg.package.iter() {
        for (dep, kind) in pkg.edges() {
            graph.add_edge(dep.as_str(), name.as_str(), kind);
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(ApplinkError::DependencyCycle(format!(
            "cycle detected in dependencies involving package '{}'",
            cycle.node_id()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<WorkspaceConfig> {
        let raw: RawWorkspaceConfig = toml::from_str(src)?;
        WorkspaceConfig::try_from(raw)
    }

    #[test]
    fn dev_cycles_are_rejected() {
        let err = parse(
            r#"
[default]
build = "make"

[package.a]
dir = "a"
deps = ["b"]

[package.b]
dir = "b"
dev_deps = ["a"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApplinkError::DependencyCycle(_)), "got {err:?}");
    }

    #[test]
    fn shared_directories_are_rejected() {
        let err = parse(
            r#"
[default]
build = "make"

[package.a]
dir = "libs/x"

[package.b]
dir = "libs/x/"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApplinkError::ConfigError(msg) if msg.contains("share the directory")));
    }

    #[test]
    fn missing_build_command_is_rejected() {
        let err = parse(
            r#"
[package.a]
dir = "a"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApplinkError::ConfigError(msg) if msg.contains("no `build` command")));
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let err = parse(
            r#"
[config]
debounce_ms = 0

[package.a]
dir = "a"
build = "make"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApplinkError::ConfigError(_)));
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let err = parse(
            r#"
[default]
build = "make"
exclude = ["src/[oops"]

[package.a]
dir = "a"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ApplinkError::ConfigError(msg) if msg.contains("invalid glob")));
    }
}
