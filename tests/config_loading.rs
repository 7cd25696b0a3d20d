// tests/config_loading.rs

use std::fs;

use tempfile::tempdir;

use applink::config::{load_and_validate, load_from_path};
use applink::errors::ApplinkError;
use applink::graph::DependencyGraph;
use applink::target_scope;
use applink::types::DependencyKind;
use applink_test_utils::builders::ManifestBuilder;

fn write_manifest(manifest: &ManifestBuilder) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Applink.toml");
    fs::write(&path, manifest.to_toml()).unwrap();
    (dir, path)
}

fn workspace() -> ManifestBuilder {
    ManifestBuilder::new()
        .debounce_ms(50)
        .default_build("npm run build")
        .exclude("**/dist/**")
        .independent("**/*.test.ts")
        .package("@acme/util")
        .dir("libs/util")
        .package("@acme/model")
        .dir("libs/model")
        .deps(&["@acme/util"])
        .package("@acme/mocks")
        .dir("tools/mocks")
        .deps(&["@acme/model"])
        .package("@acme/ui")
        .dir("libs/ui")
        .build("npm run build-esm")
        .deps(&["@acme/model"])
        .dev_deps(&["@acme/mocks"])
        .peer_deps(&["@acme/util"])
}

#[test]
fn manifest_round_trips_into_graph() {
    let (_dir, path) = write_manifest(&workspace());
    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.config.debounce_ms, 50);
    assert_eq!(cfg.build_command("@acme/ui"), Some("npm run build-esm"));
    assert_eq!(cfg.build_command("@acme/util"), Some("npm run build"));

    let graph = DependencyGraph::from_config(&cfg);
    assert_eq!(graph.len(), 4);

    let ui_deps: Vec<(String, DependencyKind)> = graph
        .dependencies_of("@acme/ui")
        .unwrap()
        .iter()
        .map(|d| (d.name.clone(), d.kind))
        .collect();
    assert!(ui_deps.contains(&("@acme/mocks".into(), DependencyKind::Dev)));
    assert!(ui_deps.contains(&("@acme/util".into(), DependencyKind::Peer)));

    let dependents = graph
        .transitive_dependents(["@acme/util"], &[DependencyKind::Prod])
        .unwrap();
    assert_eq!(
        dependents.into_iter().collect::<Vec<_>>(),
        vec!["@acme/mocks", "@acme/model", "@acme/ui"]
    );
}

#[test]
fn target_scope_follows_every_edge_kind() {
    let (_dir, path) = write_manifest(&workspace());
    let cfg = load_and_validate(&path).unwrap();
    let graph = DependencyGraph::from_config(&cfg);

    assert_eq!(
        target_scope(&graph, Some("@acme/model")).unwrap(),
        vec!["@acme/model", "@acme/util"]
    );
    assert_eq!(target_scope(&graph, Some("@acme/ui")).unwrap().len(), 4);
}

#[test]
fn prod_cycle_is_rejected() {
    let manifest = ManifestBuilder::new()
        .default_build("make")
        .package("a")
        .deps(&["b"])
        .package("b")
        .deps(&["c"])
        .package("c")
        .deps(&["a"]);
    let (_dir, path) = write_manifest(&manifest);

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ApplinkError::DependencyCycle(_)), "got {err:?}");
}

#[test]
fn dev_cycle_is_rejected() {
    // Both ends dirty would wait on each other forever.
    let manifest = ManifestBuilder::new()
        .default_build("make")
        .package("reference-workspace")
        .dev_deps(&["mockingbird"])
        .package("mockingbird")
        .deps(&["reference-workspace"]);
    let (_dir, path) = write_manifest(&manifest);

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ApplinkError::DependencyCycle(_)), "got {err:?}");
}

#[test]
fn dev_and_peer_edges_without_cycles_are_accepted() {
    let manifest = ManifestBuilder::new()
        .default_build("make")
        .package("reference-workspace")
        .package("mockingbird")
        .dev_deps(&["reference-workspace"])
        .package("ui")
        .dev_deps(&["mockingbird"])
        .peer_deps(&["reference-workspace"]);
    let (_dir, path) = write_manifest(&manifest);

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.package.len(), 3);
}

#[test]
fn unknown_dependency_is_a_config_error() {
    let manifest = ManifestBuilder::new()
        .default_build("make")
        .package("a")
        .peer_deps(&["missing"]);
    let (_dir, path) = write_manifest(&manifest);

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ApplinkError::ConfigError(msg) if msg.contains("missing")));
}

#[test]
fn malformed_toml_and_missing_file_are_typed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Applink.toml");
    fs::write(&path, "[package.a\ndir = ").unwrap();
    assert!(matches!(load_from_path(&path), Err(ApplinkError::TomlError(_))));

    let missing = dir.path().join("nope.toml");
    assert!(matches!(load_from_path(&missing), Err(ApplinkError::IoError(_))));
}
