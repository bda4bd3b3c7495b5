use std::path::PathBuf;

/// Result type for extension manager operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the extension system.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Extension name fails the well-formedness check.
    ///
    /// Bulk discovery/load treats this as "skip"; explicit single-package
    /// operations surface it.
    #[error("invalid extension name '{name}': must not start with an underscore or contain whitespace")]
    InvalidPackageName { name: String },

    /// A manifest exists for the package but no registration factory is
    /// known for its identifier. Distinguishes a malformed package from the
    /// mere absence of one.
    #[error("missing registration for extension '{identifier}': manifest found but no factory is registered")]
    MissingRegistration { identifier: String },

    /// Failed to parse an extension manifest.
    #[error("failed to parse extension manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// Extension manifest file not found at the expected path.
    #[error("extension manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Invalid semver version string.
    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },

    /// Topological ordering exceeded the iteration ceiling.
    #[error("cyclic dependency detected; unresolved extensions: {remaining:?}")]
    CyclicDependency { remaining: Vec<String> },

    /// Install-time failure to construct or persist the package record.
    #[error("failed to apply package record for '{identifier}': {reason}")]
    PackageRecord { identifier: String, reason: String },

    /// The external migration runner reported a failure.
    #[error("migration failed for '{identifier}': {reason}")]
    Migration { identifier: String, reason: String },

    /// Extension not present in the registry.
    #[error("unknown extension: {0}")]
    UnknownExtension(String),

    /// Archive ingestion validation failure; no partial extraction is kept.
    #[error("malformed extension archive: {reason}")]
    MalformedArchive { reason: String },

    /// Failed to serialize the installed-state file.
    #[error("failed to serialize installed state: {0}")]
    StateSerialize(String),

    /// I/O error reading or writing extension files.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the filesystem layer.
    #[error(transparent)]
    Fs(#[from] ext_fs::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
