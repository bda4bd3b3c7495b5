//! Relative path confinement checks

use std::path::{Component, Path};

/// Check that a path is relative and stays inside its base directory.
///
/// Rejects absolute paths, paths with a root component, and any `..`
/// traversal. Used to guard archive extraction and manifest-declared
/// sub-paths against escaping the packages root.
pub fn is_confined_relative(path: &Path) -> bool {
    if path.has_root() || path.is_absolute() {
        return false;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
