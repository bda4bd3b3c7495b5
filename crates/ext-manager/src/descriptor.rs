//! Loaded package descriptors.

use std::path::PathBuf;

use crate::extension::Extension;
use crate::manifest::PackageManifest;

/// A discovered and loaded extension package.
///
/// Created once at load time; `disabled` is the only field mutated
/// afterwards (by the installation manager or the unmet-dependency sweep).
pub struct PackageDescriptor {
    /// Dot-delimited identifier (`vendor.package`), derived from the
    /// directory path.
    pub identifier: String,
    /// Package root on disk.
    pub path: PathBuf,
    /// Parsed manifest metadata.
    pub manifest: PackageManifest,
    /// Whether the package is disabled. Initialized from the installed
    /// state store.
    pub disabled: bool,
    extension: Box<dyn Extension>,
}

impl PackageDescriptor {
    pub fn new(
        identifier: impl Into<String>,
        path: impl Into<PathBuf>,
        manifest: PackageManifest,
        extension: Box<dyn Extension>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            path: path.into(),
            manifest,
            disabled: false,
            extension,
        }
    }

    /// The registration object for this package.
    pub fn extension(&self) -> &dyn Extension {
        self.extension.as_ref()
    }

    /// The manifest-declared version, if any.
    pub fn version(&self) -> Option<&str> {
        self.manifest.version.as_deref()
    }

    /// Declared dependency identifiers, or `None` when the manifest has no
    /// `require` key.
    pub fn require_identifiers(&self) -> Option<Vec<String>> {
        self.manifest.require_identifiers()
    }
}

impl std::fmt::Debug for PackageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageDescriptor")
            .field("identifier", &self.identifier)
            .field("path", &self.path)
            .field("disabled", &self.disabled)
            .finish()
    }
}
