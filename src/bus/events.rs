// src/bus/events.rs

use std::sync::Arc;

use crate::graph::DependencyGraph;
use crate::types::PackageName;

/// A single package touched by a change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageChange {
    pub package_name: PackageName,
    /// The change cannot affect dependents (e.g. only tests changed), so the
    /// package is rebuilt without dirtying anything downstream.
    pub independent: bool,
}

impl PackageChange {
    pub fn new(package_name: impl Into<PackageName>) -> Self {
        Self {
            package_name: package_name.into(),
            independent: false,
        }
    }

    pub fn independent(package_name: impl Into<PackageName>) -> Self {
        Self {
            package_name: package_name.into(),
            independent: true,
        }
    }
}

/// Everything that flows over the [`EventBus`](crate::bus::EventBus).
///
/// Inputs to the scheduler come from target selection, the watcher and the
/// build executor; `BuildScheduled`, `BuildRequested` and `PackagesRebuilt`
/// are emitted by the scheduler itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// A build target was chosen; `package_scope` lists every package the
    /// scheduler should track.
    TargetSelected {
        package_scope: Vec<PackageName>,
        dependency_graph: Arc<DependencyGraph>,
    },
    /// Sources of one or more packages changed.
    PackagesChanged { changes: Vec<PackageChange> },
    /// The executor started building a package.
    BuildStarted { package_name: PackageName },
    /// A build process exited.
    BuildFinished {
        package_name: PackageName,
        exit_code: i32,
    },
    /// Informational: what a `PackagesChanged` dirtied.
    BuildScheduled {
        changed_packages: Vec<PackageName>,
        affected_dependents: Vec<PackageName>,
    },
    /// Start a build of this package now.
    BuildRequested { package_name: PackageName },
    /// Every tracked package is clean again; lists what became clean since
    /// the previous such event.
    PackagesRebuilt { package_names: Vec<PackageName> },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

impl DomainEvent {
    /// Short, stable name of the variant for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::TargetSelected { .. } => "TargetSelected",
            DomainEvent::PackagesChanged { .. } => "PackagesChanged",
            DomainEvent::BuildStarted { .. } => "BuildStarted",
            DomainEvent::BuildFinished { .. } => "BuildFinished",
            DomainEvent::BuildScheduled { .. } => "BuildScheduled",
            DomainEvent::BuildRequested { .. } => "BuildRequested",
            DomainEvent::PackagesRebuilt { .. } => "PackagesRebuilt",
            DomainEvent::ShutdownRequested => "ShutdownRequested",
        }
    }
}
