//! Extension manifest parsing for `extension.json` files.
//!
//! A manifest names the extension and declares its requirements. The
//! recognized `require` key accepts three shapes: a single identifier, a
//! list of identifiers, or a map whose keys are identifiers (map values are
//! version constraints, ignored at this layer and left to the migration
//! runner).
//!
//! # Example JSON
//!
//! ```json
//! {
//!     "code": "acme.cart",
//!     "name": "Acme Cart",
//!     "version": "1.2.0",
//!     "require": {
//!         "acme.payments": ">=1.0",
//!         "acme.menu": "*"
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::MANIFEST_FILENAME;
use crate::error::{Error, Result};

/// Dependency declarations from the manifest `require` key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Require {
    /// A single dependency identifier.
    One(String),
    /// A list of dependency identifiers.
    Many(Vec<String>),
    /// Identifiers mapped to version constraints. Constraints are not
    /// interpreted here.
    Constraints(BTreeMap<String, serde_json::Value>),
}

impl Require {
    /// The declared dependency identifiers, in declaration order
    /// (lexical order for the map form).
    pub fn identifiers(&self) -> Vec<String> {
        match self {
            Require::One(id) => vec![id.clone()],
            Require::Many(ids) => ids.clone(),
            Require::Constraints(map) => map.keys().cloned().collect(),
        }
    }
}

/// Extension metadata loaded from `extension.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageManifest {
    /// Dot-delimited extension code (`vendor.package`). Required for
    /// archive ingestion; optional on disk where the identifier derives
    /// from the directory path.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable extension name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Dependency declarations.
    #[serde(default)]
    pub require: Option<Require>,
    /// Unrecognized manifest keys, preserved as-is.
    #[serde(default, flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PackageManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read and parse a manifest from a file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&content)
    }

    /// The declared dependency identifiers, or `None` when the manifest has
    /// no `require` key.
    pub fn require_identifiers(&self) -> Option<Vec<String>> {
        self.require.as_ref().map(Require::identifiers)
    }
}

/// Locate the manifest file directly inside `dir`, matching the filename
/// case-insensitively.
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if name
            .to_str()
            .is_some_and(|n| n.eq_ignore_ascii_case(MANIFEST_FILENAME))
        {
            let path = entry.path();
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}
