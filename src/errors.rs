// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Build failures are *not* errors: they are recorded as per-package state by
//! the scheduler. Everything in here is either a config problem or a defect in
//! one of the collaborators feeding the scheduler (watcher, executor, graph
//! construction).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplinkError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A package name was referenced that is not part of the active graph.
    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    /// Target selection referenced packages outside the supplied graph.
    #[error("Malformed target selection: {0}")]
    MalformedTarget(String),

    /// A graph-dependent event arrived before any target was selected.
    #[error("No build target selected (received {0} before TargetSelected)")]
    NoTargetSelected(&'static str),

    /// Lifecycle events arrived in an order the scheduler cannot explain.
    #[error("Event ordering violation: {0}")]
    EventOrder(String),

    #[error("Cycle detected in dependency graph: {0}")]
    DependencyCycle(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ApplinkError>;
