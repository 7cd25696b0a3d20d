// src/scheduler/scheduler_step.rs

//! Result type for a single scheduler transition.

use crate::bus::DomainEvent;
use crate::types::PackageName;

/// What a `PackagesChanged` dirtied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildScheduled {
    pub changed_packages: Vec<PackageName>,
    /// Transitive `prod` dependents of the changed packages, excluding the
    /// changed packages themselves.
    pub affected_dependents: Vec<PackageName>,
}

/// Structured result of one scheduler transition.
///
/// Tests step the scheduler directly and assert on this; the bus listener
/// turns it into events with [`SchedulerStep::into_events`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStep {
    /// Set when the step handled a `PackagesChanged`.
    pub scheduled: Option<BuildScheduled>,
    /// Packages that entered the frontier in this step.
    pub newly_requested: Vec<PackageName>,
    /// Set when this step left every tracked package clean.
    pub rebuilt: Option<Vec<PackageName>>,
}

impl SchedulerStep {
    /// Events to emit, in order: `BuildScheduled`, `BuildRequested`s,
    /// `PackagesRebuilt`.
    pub fn into_events(self) -> Vec<DomainEvent> {
        let mut events = Vec::new();

        if let Some(s) = self.scheduled {
            events.push(DomainEvent::BuildScheduled {
                changed_packages: s.changed_packages,
                affected_dependents: s.affected_dependents,
            });
        }

        events.extend(
            self.newly_requested
                .into_iter()
                .map(|package_name| DomainEvent::BuildRequested { package_name }),
        );

        if let Some(package_names) = self.rebuilt {
            events.push(DomainEvent::PackagesRebuilt { package_names });
        }

        events
    }
}
