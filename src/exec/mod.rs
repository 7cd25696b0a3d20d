// src/exec/mod.rs

//! Build execution layer.
//!
//! Runs package build commands with `tokio::process::Command` and reports
//! back to the runtime as `BuildStarted` / `BuildFinished` events.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `RealExecutorBackend`; tests swap in a fake.
//! - [`executor_loop`] owns the background loop that keeps at most one build
//!   process per package.
//! - [`build_runner`] runs a single build process.

pub mod backend;
pub mod build_runner;
pub mod executor_loop;

pub use backend::{BuildCatalog, BuildJob, ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
