// src/config/mod.rs

//! Workspace manifest loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate invariants like edge targets and acyclicity over every dependency kind (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigSection, DefaultSection, PackageConfig, RawWorkspaceConfig, WorkspaceConfig,
};
