// src/scheduler/mod.rs

//! Incremental build scheduling.
//!
//! - [`package_state`] holds the per-package flags the scheduler tracks.
//! - [`frontier`] computes which dirty packages can be built right now.
//! - [`build_scheduler`] is the event-driven state machine that ties the two
//!   together and listens on the [`EventBus`](crate::bus::EventBus).
//! - [`scheduler_step`] defines the result type of a single transition.

pub mod build_scheduler;
pub mod frontier;
pub mod package_state;
pub mod scheduler_step;

pub use build_scheduler::BuildScheduler;
pub use frontier::dirty_frontier;
pub use package_state::{PackageState, PackageStatus};
pub use scheduler_step::{BuildScheduled, SchedulerStep};
