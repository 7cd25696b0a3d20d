// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawWorkspaceConfig, WorkspaceConfig};
use crate::errors::Result;

/// Load a manifest from a given path and return the raw `RawWorkspaceConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkspaceConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawWorkspaceConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a manifest from path and validate it.
///
/// Checks for unknown dependency references, duplicate package directories,
/// dependency cycles, missing build commands and invalid globs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WorkspaceConfig> {
    let raw_config = load_from_path(&path)?;
    let config = WorkspaceConfig::try_from(raw_config)?;
    Ok(config)
}

/// `Applink.toml` in the current working directory, unless `APPLINK_CONFIG`
/// points somewhere else.
pub fn default_config_path() -> PathBuf {
    std::env::var_os("APPLINK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Applink.toml"))
}
