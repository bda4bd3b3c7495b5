//! Package discovery by directory convention.
//!
//! The packages root holds vendor directories, each holding package
//! directories: `<root>/<vendor>/<package>/`. A directory at depth 2 is a
//! package if and only if it directly contains an `extension.json` manifest
//! (matched case-insensitively). Nothing shallower or deeper qualifies.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ident;
use crate::manifest;

/// A package located during a scan, not yet loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPackage {
    /// Vendor directory name.
    pub vendor: String,
    /// Package directory name.
    pub name: String,
    /// Package root on disk.
    pub path: PathBuf,
}

impl DiscoveredPackage {
    /// The dot-delimited identifier for this package.
    pub fn identifier(&self) -> String {
        ident::identifier(&self.vendor, &self.name)
    }
}

/// Scan the packages root for extension packages.
///
/// Walks exactly two directory levels, following symlinks. Results are
/// sorted lexically by vendor then package so discovery order is
/// deterministic regardless of filesystem enumeration order. A missing root
/// yields an empty list.
pub fn scan(root: &Path) -> Result<Vec<DiscoveredPackage>> {
    let mut found = Vec::new();
    if !root.is_dir() {
        return Ok(found);
    }

    for vendor_dir in sorted_subdirectories(root)? {
        let vendor = match dir_name(&vendor_dir) {
            Some(name) => name,
            None => continue,
        };

        for package_dir in sorted_subdirectories(&vendor_dir)? {
            let name = match dir_name(&package_dir) {
                Some(name) => name,
                None => continue,
            };

            if manifest::find_manifest(&package_dir).is_some() {
                found.push(DiscoveredPackage {
                    vendor: vendor.clone(),
                    name,
                    path: package_dir,
                });
            }
        }
    }

    Ok(found)
}

/// Direct subdirectories of `dir`, sorted by name. Symlinks to directories
/// are included.
fn sorted_subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut dirs: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        // fs::metadata follows symlinks, so linked package trees count.
        let is_dir = std::fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
        if is_dir {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
