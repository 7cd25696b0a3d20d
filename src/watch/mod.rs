// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Mapping changed files to the workspace package that owns them.
//! - Ignoring excluded paths and classifying "independent" changes.
//! - Batching changes over a debounce window into one `PackagesChanged`.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** know about dependencies; dirtiness propagation is the
//! scheduler's job.

pub mod batch;
pub mod locator;
pub mod path_utils;
pub mod watcher;

pub use batch::ChangeBatch;
pub use locator::{FileChange, PackageLocator};
pub use watcher::{spawn_watcher, WatcherHandle};
