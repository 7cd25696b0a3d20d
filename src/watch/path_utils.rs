// src/watch/path_utils.rs

//! Path helpers shared by the locator and the watcher.

use std::path::{Component, Path};

/// `path` relative to `base` as a forward-slash string.
///
/// Tries a plain `strip_prefix` first; if that fails (symlinks, `/private`
/// prefixes on macOS) both sides are canonicalized and compared again.
/// Returns `None` if `path` is not under `base`.
pub fn relative_str(base: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(base) {
        return Some(to_slash(rel));
    }

    let base_canon = base.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&base_canon).ok().map(to_slash)
}

/// Normalize a manifest-relative directory: forward slashes, no `.`
/// components, no trailing slash.
pub fn normalize_dir(dir: &str) -> String {
    let parts: Vec<String> = Path::new(dir)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
