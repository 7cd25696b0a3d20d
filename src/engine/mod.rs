// src/engine/mod.rs

//! Async runtime around the event bus.
//!
//! The scheduler itself is synchronous; this module is the single consumer of
//! the ordered event channel that the watcher and the executor write into. It
//! publishes each event on the bus and hands emitted build requests to an
//! [`ExecutorBackend`](crate::exec::ExecutorBackend).

pub mod runtime;

pub use runtime::{Runtime, RunSummary};

/// Runtime options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit as soon as no build is in flight (used for `--once`).
    pub exit_when_idle: bool,
}
