//! Extension discovery, dependency resolution, and lifecycle management.
//!
//! Extensions are self-describing packages laid out two levels below a
//! packages root (`<root>/<vendor>/<package>/`), detected by the presence of
//! an [`MANIFEST_FILENAME`] manifest. The manager loads them into an
//! insertion-ordered registry, resolves declared dependencies, runs the
//! register/boot lifecycle, and persists install state to a JSON file.

pub mod archive;
pub mod dependency;
pub mod descriptor;
pub mod discover;
pub mod error;
pub mod extension;
pub mod hooks;
pub mod ident;
pub mod install;
pub mod lifecycle;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod state;

/// The canonical filename for extension manifests.
///
/// A directory two levels below the packages root is treated as an extension
/// package if and only if it directly contains a file with this name
/// (matched case-insensitively).
pub const MANIFEST_FILENAME: &str = "extension.json";

/// Routes file loaded through [`hooks::FrameworkHooks::load_routes`] when present.
pub const ROUTES_FILENAME: &str = "routes.json";

/// Locale directory registered even for disabled extensions.
pub const LANGUAGE_DIR: &str = "language";

/// Configuration directory merged into the framework config namespace.
pub const CONFIG_DIR: &str = "config";

/// View template directory registered as a view namespace.
pub const VIEWS_DIR: &str = "views";

/// Bundled third-party dependency directory passed to the autoload hook.
pub const VENDOR_DIR: &str = "vendor";

pub use descriptor::PackageDescriptor;
pub use error::{Error, Result};
pub use extension::{Extension, ExtensionRegistrar, NullExtension};
pub use hooks::{FrameworkHooks, NullHooks};
pub use install::{
    InMemoryPackageRecords, InstallationManager, MigrationRunner, NullMigrationRunner,
    PackageRecord, PackageRecords,
};
pub use lifecycle::LifecycleManager;
pub use manager::{ExtensionManager, ManagerConfig};
pub use manifest::{PackageManifest, Require};
pub use registry::PackageRegistry;
pub use state::InstalledStateStore;
