// src/lib.rs

pub mod bus;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod graph;
pub mod logging;
pub mod scheduler;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::bus::{DomainEvent, EventBus, PackageChange};
use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, WorkspaceConfig};
use crate::engine::{RunSummary, Runtime, RuntimeOptions};
use crate::errors::ApplinkError;
use crate::exec::{BuildCatalog, RealExecutorBackend};
use crate::graph::DependencyGraph;
use crate::scheduler::BuildScheduler;
use crate::types::{DependencyKind, PackageName};
use crate::watch::PackageLocator;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading and graph construction
/// - target scope selection
/// - event bus + build scheduler
/// - executor
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)?;
    let root = manifest_root(&config_path);

    let graph = Arc::new(DependencyGraph::from_config(&cfg));
    let scope = target_scope(&graph, args.target.as_deref())?;

    if args.dry_run {
        print_dry_run(&cfg, &graph, &scope);
        return Ok(());
    }

    let (rt_tx, rt_rx) = mpsc::channel::<DomainEvent>(256);

    let executor = RealExecutorBackend::new(BuildCatalog::from_config(&cfg, &root), rt_tx.clone());

    // Optional file watcher (disabled in --once mode).
    let _watcher_handle = if !args.once {
        let mut locator = PackageLocator::from_config(&cfg, &root)?;
        locator.retain(|name| scope.iter().any(|s| s == name));
        Some(crate::watch::spawn_watcher(
            locator,
            Duration::from_millis(cfg.config.debounce_ms),
            rt_tx.clone(),
        )?)
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(DomainEvent::ShutdownRequested).await;
        });
    }

    info!(build_target = ?args.target, packages = scope.len(), "selecting build target");
    rt_tx
        .send(DomainEvent::TargetSelected {
            package_scope: scope.clone(),
            dependency_graph: Arc::clone(&graph),
        })
        .await?;

    if args.once {
        rt_tx
            .send(DomainEvent::PackagesChanged {
                changes: scope.iter().map(PackageChange::new).collect(),
            })
            .await?;
    }

    let mut bus = EventBus::new();
    bus.subscribe(BuildScheduler::new());

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };
    let runtime = Runtime::new(bus, rt_rx, executor, options);
    let summary = runtime.run().await?;

    if args.once {
        ensure_scope_rebuilt(&summary)?;
    }

    Ok(())
}

/// `--once` succeeds only if every scheduled package finished clean.
fn ensure_scope_rebuilt(summary: &RunSummary) -> Result<()> {
    if summary.is_clean() {
        return Ok(());
    }
    if summary.failed.is_empty() {
        bail!("packages never rebuilt: {}", summary.unbuilt.join(", "));
    }
    bail!(
        "builds failed for: {} (not rebuilt: {})",
        summary.failed.join(", "),
        summary.unbuilt.join(", ")
    );
}

/// Packages tracked for `target`: its dependency closure over every edge
/// kind, or the whole workspace when no target is given.
pub fn target_scope(
    graph: &DependencyGraph,
    target: Option<&str>,
) -> std::result::Result<Vec<PackageName>, ApplinkError> {
    match target {
        None => Ok(graph.packages().map(str::to_string).collect()),
        Some(name) => {
            if !graph.contains(name) {
                return Err(ApplinkError::MalformedTarget(format!(
                    "target '{}' is not a workspace package",
                    name
                )));
            }
            let closure = graph.dependency_closure(name, &DependencyKind::ALL)?;
            Ok(closure.into_iter().collect())
        }
    }
}

/// Directory that package `dir` entries are relative to.
///
/// - If the manifest path has a non-empty parent, that directory.
/// - For a bare file name, the current working directory.
fn manifest_root(config_path: &Path) -> PathBuf {
    let root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    root.canonicalize().unwrap_or(root)
}

/// Print the tracked scope, build commands and dependency edges.
fn print_dry_run(cfg: &WorkspaceConfig, graph: &DependencyGraph, scope: &[PackageName]) {
    println!("applink dry-run");
    println!("  config.debounce_ms = {}", cfg.config.debounce_ms);
    println!();

    println!("packages in scope ({} of {}):", scope.len(), graph.len());
    for name in scope {
        println!("  - {name}");
        if let Some(pkg) = cfg.package.get(name) {
            println!("      dir: {}", pkg.dir);
        }
        if let Some(build) = cfg.build_command(name) {
            println!("      build: {build}");
        }
        if let Ok(deps) = graph.dependencies_of(name) {
            for dep in deps.iter().filter(|d| scope.contains(&d.name)) {
                println!("      {} -> {}", dep.kind, dep.name);
            }
        }
    }

    debug!("dry-run complete (no builds)");
}
