// src/engine/runtime.rs

use std::collections::BTreeSet;
use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bus::{DomainEvent, EventBus};
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::types::PackageName;

use super::RuntimeOptions;

/// What happened during a runtime session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of `PackagesRebuilt` events seen.
    pub rebuilds: usize,
    /// Packages whose most recent build failed, at exit time.
    pub failed: Vec<PackageName>,
    /// Packages scheduled for a rebuild that had not finished clean by exit
    /// time, excluding `failed` ones (typically their blocked dependents).
    pub unbuilt: Vec<PackageName>,
}

impl RunSummary {
    /// Every scheduled package ended up built and clean.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.unbuilt.is_empty()
    }
}

/// Drains `event_rx` into the [`EventBus`] and forwards emitted
/// `BuildRequested` events to the executor.
///
/// This is the only task that touches the bus, so the scheduler listening on
/// it sees events strictly in channel order.
pub struct Runtime<E: ExecutorBackend> {
    bus: EventBus,
    event_rx: mpsc::Receiver<DomainEvent>,
    executor: E,
    options: RuntimeOptions,
    in_flight: BTreeSet<PackageName>,
    failed: BTreeSet<PackageName>,
    /// Between `BuildStarted` and `BuildFinished`.
    running: BTreeSet<PackageName>,
    /// Dirtied by a `BuildScheduled` and not yet finished clean.
    stale: BTreeSet<PackageName>,
    /// Dirtied again while running, so the running build's success does not
    /// make them clean.
    restaled: BTreeSet<PackageName>,
    rebuilds: usize,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("bus", &self.bus)
            .field("options", &self.options)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        bus: EventBus,
        event_rx: mpsc::Receiver<DomainEvent>,
        executor: E,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            bus,
            event_rx,
            executor,
            options,
            in_flight: BTreeSet::new(),
            failed: BTreeSet::new(),
            running: BTreeSet::new(),
            stale: BTreeSet::new(),
            restaled: BTreeSet::new(),
            rebuilds: 0,
        }
    }

    /// Main event loop.
    ///
    /// Stops on `ShutdownRequested`, when the channel closes, or (with
    /// `exit_when_idle`) once a change or finish leaves no build in flight.
    /// A scheduler error aborts the loop and is returned.
    pub async fn run(mut self) -> Result<RunSummary> {
        info!("applink runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(event = event.kind(), "runtime received event");

            if matches!(event, DomainEvent::ShutdownRequested) {
                info!("shutdown requested; stopping runtime");
                break;
            }

            let may_settle = self.observe_input(&event);

            let emitted = self.bus.publish(event)?;
            self.handle_emitted(emitted).await?;

            if self.options.exit_when_idle && may_settle && self.in_flight.is_empty() {
                info!("no builds in flight; exiting");
                break;
            }
        }

        let summary = RunSummary {
            rebuilds: self.rebuilds,
            unbuilt: self.stale.difference(&self.failed).cloned().collect(),
            failed: self.failed.into_iter().collect(),
        };
        if !summary.failed.is_empty() {
            warn!(failed = ?summary.failed, "runtime exiting with failed packages");
        }
        if !summary.unbuilt.is_empty() {
            warn!(
                unbuilt = ?summary.unbuilt,
                "runtime exiting with packages that were never rebuilt"
            );
        }
        info!("runtime exiting");
        Ok(summary)
    }

    /// Book-keeping for inbound events. Returns whether this event can leave
    /// the workspace settled.
    fn observe_input(&mut self, event: &DomainEvent) -> bool {
        match event {
            DomainEvent::BuildFinished {
                package_name,
                exit_code,
            } => {
                self.in_flight.remove(package_name);
                self.running.remove(package_name);
                let restaled = self.restaled.remove(package_name);
                if *exit_code == 0 {
                    self.failed.remove(package_name);
                    if !restaled {
                        self.stale.remove(package_name);
                    }
                } else {
                    self.failed.insert(package_name.clone());
                }
                true
            }
            DomainEvent::BuildStarted { package_name } => {
                self.running.insert(package_name.clone());
                false
            }
            DomainEvent::PackagesChanged { .. } => true,
            DomainEvent::TargetSelected { .. } => {
                self.in_flight.clear();
                self.failed.clear();
                self.running.clear();
                self.stale.clear();
                self.restaled.clear();
                false
            }
            _ => false,
        }
    }

    async fn handle_emitted(&mut self, emitted: Vec<DomainEvent>) -> Result<()> {
        let mut requested = Vec::new();

        for event in emitted {
            match event {
                DomainEvent::BuildRequested { package_name } => {
                    self.in_flight.insert(package_name.clone());
                    requested.push(package_name);
                }
                DomainEvent::BuildScheduled {
                    changed_packages,
                    affected_dependents,
                } => {
                    debug!(?changed_packages, ?affected_dependents, "build scheduled");
                    for name in changed_packages.into_iter().chain(affected_dependents) {
                        if self.running.contains(&name) {
                            self.restaled.insert(name.clone());
                        }
                        self.stale.insert(name);
                    }
                }
                DomainEvent::PackagesRebuilt { package_names } => {
                    self.rebuilds += 1;
                    info!(packages = ?package_names, "packages rebuilt");
                }
                other => {
                    debug!(event = other.kind(), "ignoring emitted event");
                }
            }
        }

        if !requested.is_empty() {
            debug!(?requested, "dispatching builds to executor");
            self.executor.request_builds(requested).await?;
        }

        Ok(())
    }
}
