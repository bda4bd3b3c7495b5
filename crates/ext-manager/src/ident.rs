//! Identifier well-formedness and path mapping.
//!
//! Extensions are keyed by dot-delimited identifiers (`vendor.package`)
//! derived from their directory path under the packages root.

use std::path::PathBuf;

/// Check that an extension name is well formed.
///
/// Returns `None` for names that are empty, start with an underscore, or
/// contain whitespace. Bulk callers skip such packages silently.
pub fn check_name(name: &str) -> Option<&str> {
    if name.is_empty() || name.starts_with('_') || name.chars().any(char::is_whitespace) {
        return None;
    }
    Some(name)
}

/// Build the dot-delimited identifier for a vendor/package directory pair.
pub fn identifier(vendor: &str, package: &str) -> String {
    format!("{vendor}.{package}")
}

/// Map an identifier to its path fragment below the packages root
/// (`vendor.package` -> `vendor/package`).
pub fn name_path(identifier: &str) -> PathBuf {
    PathBuf::from(identifier.replace('.', "/"))
}
