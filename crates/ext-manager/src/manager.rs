//! The extension manager facade.
//!
//! One [`ExtensionManager`] per host process, built explicitly through
//! [`ExtensionManager::initialize`] and passed where needed. It owns the
//! registry, the lifecycle phases, and the installation manager, and
//! exposes the operations the host calls: lookups, dependency queries,
//! register/boot, install/uninstall/delete, and archive ingestion.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::archive;
use crate::dependency;
use crate::descriptor::PackageDescriptor;
use crate::error::Result;
use crate::extension::ExtensionRegistrar;
use crate::hooks::FrameworkHooks;
use crate::ident;
use crate::install::{InstallationManager, MigrationRunner, PackageRecords};
use crate::lifecycle::LifecycleManager;
use crate::loader;
use crate::registry::PackageRegistry;
use crate::state::InstalledStateStore;

/// Manager construction parameters.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Packages root containing `<vendor>/<package>/` directories.
    pub root: PathBuf,
    /// Path of the persisted installed-state JSON file.
    pub state_file: PathBuf,
    /// Whether to sweep unmet dependencies at initialization.
    pub resolve_dependencies: bool,
}

impl ManagerConfig {
    pub fn new(root: impl Into<PathBuf>, state_file: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state_file: state_file.into(),
            resolve_dependencies: true,
        }
    }
}

/// Facade over discovery, dependency resolution, lifecycle, and
/// installation.
#[derive(Debug)]
pub struct ExtensionManager {
    config: ManagerConfig,
    registrar: ExtensionRegistrar,
    registry: PackageRegistry,
    lifecycle: LifecycleManager,
    installer: InstallationManager,
    registration_cache: HashMap<String, BTreeMap<String, serde_json::Value>>,
}

impl ExtensionManager {
    /// Build the manager: load persisted state, discover and load every
    /// package under the root, then (when configured) disable packages with
    /// unmet dependencies.
    pub fn initialize(
        config: ManagerConfig,
        registrar: ExtensionRegistrar,
        migrator: Box<dyn MigrationRunner>,
        records: Box<dyn PackageRecords>,
    ) -> Result<Self> {
        let state = InstalledStateStore::load(&config.state_file);

        let mut registry = PackageRegistry::new();
        loader::load_all(&mut registry, &state, &registrar, &config.root)?;

        let mut installer = InstallationManager::new(config.root.clone(), state, migrator, records);
        if config.resolve_dependencies {
            dependency::disable_unmet(&mut registry, &mut installer)?;
        }

        Ok(Self {
            config,
            registrar,
            registry,
            lifecycle: LifecycleManager::new(),
            installer,
            registration_cache: HashMap::new(),
        })
    }

    /// Look up a loaded package.
    pub fn find(&self, identifier: &str) -> Option<&PackageDescriptor> {
        self.registry.get(identifier)
    }

    /// Whether a package is loaded (disabled or not).
    pub fn has(&self, identifier: &str) -> bool {
        self.registry.contains(identifier)
    }

    /// Loaded identifiers in discovery order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.registry.identifiers().collect()
    }

    /// The on-disk path of a loaded package.
    pub fn path_of(&self, identifier: &str) -> Option<&Path> {
        self.registry.get(identifier).map(|d| d.path.as_path())
    }

    /// Where a package with the given identifier would live under the root,
    /// whether or not it is loaded, optionally extended by a sub-folder.
    pub fn folder_path(&self, identifier: &str, folder: Option<&str>) -> PathBuf {
        let mut path = self.config.root.join(ident::name_path(identifier));
        if let Some(folder) = folder {
            path.push(folder);
        }
        path
    }

    /// Whether a package is disabled (or unknown).
    pub fn is_disabled(&self, identifier: &str) -> bool {
        self.installer.is_disabled(identifier)
    }

    /// The loaded registry.
    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    /// Declared dependencies of a loaded package.
    pub fn dependencies_of(&self, identifier: &str) -> Result<Option<Vec<String>>> {
        dependency::dependencies_by_id(&self.registry, identifier)
    }

    /// Declared dependencies that are not loaded, keyed by the first
    /// dependent that requires them.
    pub fn find_missing_dependencies(&self) -> BTreeMap<String, Vec<String>> {
        dependency::find_missing(&self.registry)
    }

    /// Enabled identifiers ordered so dependencies come before dependents.
    pub fn ordered_by_dependencies(&self, subset: Option<&[String]>) -> Result<Vec<String>> {
        dependency::topological_order(&self.registry, subset)
    }

    /// Run the register phase over every loaded package. Repeat calls are
    /// no-ops.
    pub fn register_all(&mut self, hooks: &mut dyn FrameworkHooks) {
        self.lifecycle.register_all(&self.registry, hooks);
    }

    /// Run the boot phase over every loaded package. Repeat calls are
    /// no-ops.
    pub fn boot_all(&mut self) {
        self.lifecycle.boot_all(&self.registry);
    }

    /// Load one package from its expected location under the root, e.g.
    /// after extracting an archive. Returns `None` when no package exists
    /// there.
    pub fn load(&mut self, identifier: &str) -> Result<Option<&PackageDescriptor>> {
        let path = self.config.root.join(ident::name_path(identifier));
        loader::load(
            &mut self.registry,
            self.installer.state(),
            &self.registrar,
            identifier,
            &path,
        )
    }

    /// Install a loaded package: enable it, run its lifecycle, migrate, and
    /// record its version (explicit argument, else manifest, else the
    /// previously recorded one).
    pub fn install(
        &mut self,
        hooks: &mut dyn FrameworkHooks,
        identifier: &str,
        version: Option<&str>,
    ) -> Result<()> {
        self.installer.install(
            &mut self.registry,
            &self.lifecycle,
            hooks,
            identifier,
            version,
        )
    }

    /// Disable a package, optionally purging its data. Files stay on disk.
    pub fn uninstall(&mut self, identifier: &str, purge_data: bool) -> Result<()> {
        self.installer
            .uninstall(&mut self.registry, identifier, purge_data)
    }

    /// Remove a package entirely: record, optional data, files, and state
    /// entry.
    pub fn delete(&mut self, identifier: &str, purge_data: bool) -> Result<()> {
        self.installer
            .delete(&mut self.registry, identifier, purge_data)
    }

    /// Extract an uploaded extension archive under the packages root and
    /// return the declared code. The package is not loaded or installed.
    pub fn extract_archive(&self, zip_path: &Path) -> Result<String> {
        archive::extract_archive(zip_path, &self.config.root)
    }

    /// Values contributed by enabled extensions under a named registration
    /// collection, keyed by contributor identifier.
    ///
    /// Results are memoized per collection name for the lifetime of the
    /// manager and never invalidated, so contributions are computed against
    /// the enabled set as of the first query.
    pub fn registration_values(&mut self, method: &str) -> &BTreeMap<String, serde_json::Value> {
        if !self.registration_cache.contains_key(method) {
            let mut values = BTreeMap::new();
            for descriptor in self.registry.iter() {
                if descriptor.disabled {
                    continue;
                }
                if let Some(value) = descriptor.extension().registration_values(method) {
                    values.insert(descriptor.identifier.clone(), value);
                }
            }
            self.registration_cache.insert(method.to_string(), values);
        }

        &self.registration_cache[method]
    }
}
