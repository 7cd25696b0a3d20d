// src/scheduler/build_scheduler.rs

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::bus::{DomainEvent, EventListener, PackageChange};
use crate::errors::{ApplinkError, Result};
use crate::graph::DependencyGraph;
use crate::scheduler::frontier::dirty_frontier;
use crate::scheduler::package_state::PackageState;
use crate::scheduler::scheduler_step::{BuildScheduled, SchedulerStep};
use crate::types::{DependencyKind, PackageName};

/// Only production dependencies propagate dirtiness to dependents.
const PROPAGATING_KINDS: &[DependencyKind] = &[DependencyKind::Prod];

/// Event-driven incremental build scheduler.
///
/// Holds the dependency graph restricted to the selected target and one
/// [`PackageState`] per in-scope package. Every input event is processed to
/// completion (state update plus a frontier sweep) before the next one; the
/// outcome of each transition is a [`SchedulerStep`].
///
/// Build failures are recorded as state. Graph inconsistencies and
/// impossible event orderings are returned as errors.
#[derive(Debug, Default)]
pub struct BuildScheduler {
    /// `None` until the first target selection.
    graph: Option<DependencyGraph>,
    packages: BTreeMap<PackageName, PackageState>,
    /// Packages that became clean since the last `PackagesRebuilt`.
    builds_to_get_clean: BTreeSet<PackageName>,
}

impl BuildScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph restricted to the current target, if any.
    pub fn graph(&self) -> Option<&DependencyGraph> {
        self.graph.as_ref()
    }

    /// Snapshot of a package's state.
    pub fn state_of(&self, package: &str) -> Option<PackageState> {
        self.packages.get(package).copied()
    }

    /// Names of every tracked package, sorted.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(|s| s.as_str())
    }

    /// Every tracked package is clean (not dirty, not failed).
    pub fn is_all_clean(&self) -> bool {
        self.packages.values().all(PackageState::is_clean)
    }

    /// No build is requested or running.
    pub fn is_idle(&self) -> bool {
        !self.packages.values().any(PackageState::in_flight)
    }

    /// Replace the graph with its restriction to `package_scope` and reset
    /// every in-scope package to the clean baseline.
    ///
    /// Any previous state (including in-flight and failed builds) is
    /// discarded.
    pub fn select_target<S: AsRef<str>>(
        &mut self,
        package_scope: &[S],
        dependency_graph: &DependencyGraph,
    ) -> Result<SchedulerStep> {
        if package_scope.is_empty() {
            return Err(ApplinkError::MalformedTarget(
                "package scope is empty".to_string(),
            ));
        }
        if let Some(missing) = package_scope
            .iter()
            .map(|name| name.as_ref())
            .find(|name| !dependency_graph.contains(name))
        {
            return Err(ApplinkError::MalformedTarget(format!(
                "package '{}' is not part of the dependency graph",
                missing
            )));
        }

        let restricted = dependency_graph.restrict(package_scope)?;

        let in_flight: Vec<&str> = self
            .packages
            .iter()
            .filter(|(_, s)| s.in_flight())
            .map(|(n, _)| n.as_str())
            .collect();
        if !in_flight.is_empty() {
            warn!(
                ?in_flight,
                "target re-selected while builds are in flight; their state is discarded"
            );
        }

        self.packages = restricted
            .packages()
            .map(|name| (name.to_string(), PackageState::default()))
            .collect();
        self.builds_to_get_clean.clear();

        info!(
            packages = self.packages.len(),
            edges = restricted.edges().count(),
            "build target selected"
        );
        self.graph = Some(restricted);

        Ok(SchedulerStep::default())
    }

    /// Mark changed packages (and, unless independent, their transitive
    /// `prod` dependents) dirty, then sweep the frontier.
    pub fn packages_changed(&mut self, changes: &[PackageChange]) -> Result<SchedulerStep> {
        let graph = self
            .graph
            .as_ref()
            .ok_or(ApplinkError::NoTargetSelected("PackagesChanged"))?;

        if changes.is_empty() {
            debug!("empty change notification; nothing to do");
            return Ok(SchedulerStep::default());
        }

        let mut changed: BTreeSet<PackageName> = BTreeSet::new();
        for change in changes {
            if !self.packages.contains_key(&change.package_name) {
                return Err(ApplinkError::UnknownPackage(change.package_name.clone()));
            }
            changed.insert(change.package_name.clone());
        }

        let propagating = changes
            .iter()
            .filter(|c| !c.independent)
            .map(|c| c.package_name.as_str());
        let dependents = graph.transitive_dependents(propagating, PROPAGATING_KINDS)?;

        let affected_dependents: Vec<PackageName> =
            dependents.difference(&changed).cloned().collect();

        for name in changed.iter().chain(affected_dependents.iter()) {
            if let Some(state) = self.packages.get_mut(name) {
                state.dirty = true;
                if state.build_running {
                    state.build_dirty = true;
                    debug!(package = %name, "changed while building; in-flight result will be stale");
                }
            }
        }

        info!(
            changed = ?changed,
            dependents = ?affected_dependents,
            "packages changed; marked dirty"
        );

        let newly_requested = self.trigger_builds()?;

        Ok(SchedulerStep {
            scheduled: Some(BuildScheduled {
                changed_packages: changed.into_iter().collect(),
                affected_dependents,
            }),
            newly_requested,
            rebuilt: None,
        })
    }

    /// The executor picked up a build.
    pub fn build_started(&mut self, package: &str) -> Result<SchedulerStep> {
        let state = self.state_mut(package, "BuildStarted")?;

        if state.build_running {
            return Err(ApplinkError::EventOrder(format!(
                "BuildStarted for '{}' while its build is already running",
                package
            )));
        }
        if !state.build_requested {
            warn!(package = %package, "build started without a pending request");
        }

        state.build_requested = false;
        state.build_running = true;
        debug!(package = %package, "build running");

        Ok(SchedulerStep::default())
    }

    /// A build exited. Exit code `0` is success, anything else a failure.
    ///
    /// The package must have a running build: a finish that was not preceded
    /// by `BuildStarted` is an ordering violation.
    pub fn build_finished(&mut self, package: &str, exit_code: i32) -> Result<SchedulerStep> {
        let state = self.state_mut(package, "BuildFinished")?;

        if !state.build_running {
            let detail = if state.build_requested {
                "its build was requested but never started"
            } else {
                "no build is running"
            };
            return Err(ApplinkError::EventOrder(format!(
                "BuildFinished for '{}' but {}",
                package, detail
            )));
        }

        let succeeded = exit_code == 0;
        state.dirty = state.build_dirty;
        state.failed = !succeeded;
        state.build_dirty = false;
        state.build_running = false;
        state.build_requested = false;

        let now_clean = state.is_clean();
        let stale = state.dirty;

        if succeeded {
            if now_clean {
                self.builds_to_get_clean.insert(package.to_string());
                info!(package = %package, "build succeeded; package clean");
            } else {
                info!(package = %package, "build succeeded but sources changed meanwhile; rebuilding");
            }
        } else {
            warn!(
                package = %package,
                exit_code,
                stale,
                "build failed; dependents stay blocked until the package changes again"
            );
        }

        let newly_requested = self.trigger_builds()?;

        let rebuilt = if succeeded && self.is_all_clean() && !self.builds_to_get_clean.is_empty()
        {
            let names: Vec<PackageName> =
                std::mem::take(&mut self.builds_to_get_clean).into_iter().collect();
            info!(packages = ?names, "all packages clean");
            Some(names)
        } else {
            None
        };

        Ok(SchedulerStep {
            scheduled: None,
            newly_requested,
            rebuilt,
        })
    }

    fn state_mut(&mut self, package: &str, event: &'static str) -> Result<&mut PackageState> {
        if self.graph.is_none() {
            return Err(ApplinkError::NoTargetSelected(event));
        }
        self.packages
            .get_mut(package)
            .ok_or_else(|| ApplinkError::UnknownPackage(package.to_string()))
    }

    /// Request a build for every package on the dirty frontier.
    fn trigger_builds(&mut self) -> Result<Vec<PackageName>> {
        let Some(graph) = self.graph.as_ref() else {
            return Ok(Vec::new());
        };

        let frontier = dirty_frontier(graph, &self.packages)?;

        for name in frontier.iter() {
            if let Some(state) = self.packages.get_mut(name) {
                state.build_requested = true;
                state.build_running = false;
                state.build_dirty = false;
            }
        }

        if !frontier.is_empty() {
            info!(packages = ?frontier, "requesting builds");
        }

        Ok(frontier)
    }
}

impl EventListener for BuildScheduler {
    fn name(&self) -> &'static str {
        "build-scheduler"
    }

    fn on_event(&mut self, event: &DomainEvent) -> Result<Vec<DomainEvent>> {
        let step = match event {
            DomainEvent::TargetSelected {
                package_scope,
                dependency_graph,
            } => self.select_target(package_scope, dependency_graph)?,
            DomainEvent::PackagesChanged { changes } => self.packages_changed(changes)?,
            DomainEvent::BuildStarted { package_name } => self.build_started(package_name)?,
            DomainEvent::BuildFinished {
                package_name,
                exit_code,
            } => self.build_finished(package_name, *exit_code)?,
            DomainEvent::BuildScheduled { .. }
            | DomainEvent::BuildRequested { .. }
            | DomainEvent::PackagesRebuilt { .. }
            | DomainEvent::ShutdownRequested => return Ok(Vec::new()),
        };

        Ok(step.into_events())
    }
}
