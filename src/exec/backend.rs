// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of a raw mpsc sender so
//! that tests can record requested builds and answer with synthetic
//! `BuildStarted` / `BuildFinished` events.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::bus::DomainEvent;
use crate::config::WorkspaceConfig;
use crate::errors::{ApplinkError, Error, Result};
use crate::types::PackageName;

use super::executor_loop::spawn_executor;

/// Everything needed to build one package out of process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    pub package_name: PackageName,
    /// Shell command line.
    pub command: String,
    /// Working directory for the command.
    pub dir: PathBuf,
}

/// Build jobs for every package in a workspace, keyed by package name.
#[derive(Debug, Clone, Default)]
pub struct BuildCatalog {
    jobs: HashMap<PackageName, BuildJob>,
}

impl BuildCatalog {
    /// Resolve build commands and directories from a validated manifest.
    ///
    /// `root` is the directory the manifest's `dir` entries are relative to.
    pub fn from_config(cfg: &WorkspaceConfig, root: &Path) -> Self {
        let jobs = cfg
            .package
            .keys()
            .filter_map(|name| {
                let command = cfg.build_command(name)?.to_string();
                let dir = cfg.package_dir(root, name)?;
                Some((
                    name.clone(),
                    BuildJob {
                        package_name: name.clone(),
                        command,
                        dir,
                    },
                ))
            })
            .collect();
        Self { jobs }
    }

    pub fn job_for(&self, package: &str) -> Result<&BuildJob> {
        self.jobs
            .get(package)
            .ok_or_else(|| ApplinkError::UnknownPackage(package.to_string()))
    }
}

/// How requested builds are executed.
pub trait ExecutorBackend: Send {
    /// Start builds for the given packages.
    ///
    /// Implementations must eventually answer every package with a
    /// `BuildFinished` event (optionally preceded by `BuildStarted`).
    fn request_builds(
        &mut self,
        packages: Vec<PackageName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: forwards jobs to the background executor loop.
pub struct RealExecutorBackend {
    catalog: BuildCatalog,
    tx: mpsc::Sender<BuildJob>,
}

impl RealExecutorBackend {
    /// Spawns the background executor loop immediately.
    pub fn new(catalog: BuildCatalog, runtime_tx: mpsc::Sender<DomainEvent>) -> Self {
        let tx = spawn_executor(runtime_tx);
        Self { catalog, tx }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn request_builds(
        &mut self,
        packages: Vec<PackageName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Resolve up front so the future does not borrow the catalog.
        let jobs: Result<Vec<BuildJob>> = packages
            .iter()
            .map(|p| self.catalog.job_for(p).cloned())
            .collect();
        let tx = self.tx.clone();

        Box::pin(async move {
            for job in jobs? {
                tx.send(job).await.map_err(Error::from)?;
            }
            Ok(())
        })
    }
}
