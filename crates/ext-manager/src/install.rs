//! Install, uninstall, and delete state transitions.
//!
//! The installation manager owns the persisted installed-state store and
//! coordinates with two external collaborators: the migration runner (the
//! ORM's "apply migrations for package X" call) and the package-record
//! persistence behind the admin screens. Both are consumed as opaque trait
//! objects.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::hooks::FrameworkHooks;
use crate::ident;
use crate::lifecycle::LifecycleManager;
use crate::registry::PackageRegistry;
use crate::state::InstalledStateStore;

/// Database-tracked record for an installed extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub version: Option<String>,
}

/// External migration runner, consumed as an opaque collaborator.
///
/// Implementations report failures as [`Error::Migration`].
pub trait MigrationRunner {
    /// Bring the package's schema to the latest version.
    fn migrate_package(&mut self, identifier: &str) -> Result<()>;

    /// Drop the package's schema and data.
    fn purge_package(&mut self, identifier: &str) -> Result<()>;
}

/// External package-record persistence.
///
/// Implementations report failures as [`Error::PackageRecord`].
pub trait PackageRecords {
    /// Find the record for an identifier, creating it if absent. Failure to
    /// construct the record aborts an install before any state mutation.
    fn find_or_create(&mut self, identifier: &str) -> Result<PackageRecord>;

    /// Persist a record.
    fn save(&mut self, record: &PackageRecord) -> Result<()>;

    /// Delete the record for an identifier, if present.
    fn delete(&mut self, identifier: &str) -> Result<()>;
}

/// Migration runner that does nothing, for hosts without a schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMigrationRunner;

impl MigrationRunner for NullMigrationRunner {
    fn migrate_package(&mut self, _identifier: &str) -> Result<()> {
        Ok(())
    }

    fn purge_package(&mut self, _identifier: &str) -> Result<()> {
        Ok(())
    }
}

/// Package-record store backed by a plain map, for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPackageRecords {
    records: std::collections::HashMap<String, PackageRecord>,
}

impl InMemoryPackageRecords {
    pub fn get(&self, identifier: &str) -> Option<&PackageRecord> {
        self.records.get(identifier)
    }
}

impl PackageRecords for InMemoryPackageRecords {
    fn find_or_create(&mut self, identifier: &str) -> Result<PackageRecord> {
        Ok(self
            .records
            .entry(identifier.to_string())
            .or_insert_with(|| PackageRecord {
                name: identifier.to_string(),
                version: None,
            })
            .clone())
    }

    fn save(&mut self, record: &PackageRecord) -> Result<()> {
        self.records.insert(record.name.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, identifier: &str) -> Result<()> {
        self.records.remove(identifier);
        Ok(())
    }
}

/// Orchestrates install / uninstall / delete transitions and owns the
/// installed-state store.
pub struct InstallationManager {
    root: PathBuf,
    state: InstalledStateStore,
    migrator: Box<dyn MigrationRunner>,
    records: Box<dyn PackageRecords>,
}

impl InstallationManager {
    pub fn new(
        root: impl Into<PathBuf>,
        state: InstalledStateStore,
        migrator: Box<dyn MigrationRunner>,
        records: Box<dyn PackageRecords>,
    ) -> Self {
        Self {
            root: root.into(),
            state,
            migrator,
            records,
        }
    }

    /// The installed-state store.
    pub fn state(&self) -> &InstalledStateStore {
        &self.state
    }

    /// Whether an extension is disabled (absent or explicitly false).
    pub fn is_disabled(&self, identifier: &str) -> bool {
        self.state.is_disabled(identifier)
    }

    /// Mutate the persisted installed state, tri-state: `Some(true)`
    /// enabled, `Some(false)` disabled, `None` removes the entry entirely.
    ///
    /// Disabling also flips the in-registry descriptor, so the change takes
    /// effect without a reload.
    pub fn set_installed(
        &mut self,
        registry: &mut PackageRegistry,
        identifier: &str,
        enabled: Option<bool>,
    ) -> Result<()> {
        match enabled {
            Some(enabled) => self.state.set(identifier, enabled)?,
            None => self.state.remove(identifier)?,
        }

        if enabled == Some(false) {
            registry.set_disabled(identifier, true);
        }

        Ok(())
    }

    /// Install a new or existing extension.
    ///
    /// The package is registered and booted before migrations run so its
    /// services are available to them. The recorded version is the explicit
    /// argument, else the manifest-declared version, else whatever the
    /// record already holds.
    pub fn install(
        &mut self,
        registry: &mut PackageRegistry,
        lifecycle: &LifecycleManager,
        hooks: &mut dyn FrameworkHooks,
        identifier: &str,
        version: Option<&str>,
    ) -> Result<()> {
        let mut record = self.records.find_or_create(identifier)?;

        if !registry.contains(identifier) {
            return Err(Error::UnknownExtension(identifier.to_string()));
        }

        registry.set_disabled(identifier, false);
        if let Some(descriptor) = registry.get(identifier) {
            lifecycle.register_one(descriptor, hooks);
            lifecycle.boot_one(Some(descriptor));
        }

        self.migrator.migrate_package(identifier)?;

        let version = version
            .map(str::to_string)
            .or_else(|| registry.get(identifier).and_then(|d| d.version().map(String::from)))
            .or_else(|| record.version.clone());
        if let Some(v) = &version {
            semver::Version::parse(v).map_err(|e| Error::InvalidVersion {
                version: v.clone(),
                source: e,
            })?;
        }
        record.version = version;
        self.records.save(&record)?;

        self.set_installed(registry, identifier, Some(true))?;
        tracing::info!(identifier, version = record.version.as_deref(), "Installed extension");

        Ok(())
    }

    /// Uninstall an extension, optionally purging its data. Files stay on
    /// disk and the state entry becomes an explicit `false`.
    pub fn uninstall(
        &mut self,
        registry: &mut PackageRegistry,
        identifier: &str,
        purge_data: bool,
    ) -> Result<()> {
        if purge_data {
            self.migrator.purge_package(identifier)?;
        }

        self.set_installed(registry, identifier, Some(false))?;
        tracing::info!(identifier, purge_data, "Uninstalled extension");

        Ok(())
    }

    /// Delete an extension: drop its record, optionally purge its data,
    /// remove its files, and remove its state entry entirely so the
    /// identifier reads as "never installed".
    pub fn delete(
        &mut self,
        registry: &mut PackageRegistry,
        identifier: &str,
        purge_data: bool,
    ) -> Result<()> {
        self.records.delete(identifier)?;

        if purge_data {
            self.migrator.purge_package(identifier)?;
        }

        self.remove_files(identifier)?;
        self.set_installed(registry, identifier, None)?;
        tracing::info!(identifier, purge_data, "Deleted extension");

        Ok(())
    }

    /// Remove the package directory, and its vendor directory when that
    /// leaves the vendor empty of subdirectories.
    pub fn remove_files(&self, identifier: &str) -> Result<()> {
        let package_path = self.root.join(ident::name_path(identifier));

        if package_path.is_dir() {
            fs::remove_dir_all(&package_path).map_err(|e| Error::io(&package_path, e))?;
        }

        if let Some(vendor_path) = package_path.parent() {
            // Never collapse the packages root itself.
            if vendor_path != self.root
                && vendor_path.is_dir()
                && !has_subdirectories(vendor_path)?
            {
                fs::remove_dir_all(vendor_path).map_err(|e| Error::io(vendor_path, e))?;
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for InstallationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationManager")
            .field("root", &self.root)
            .field("state", &self.state)
            .finish()
    }
}

fn has_subdirectories(dir: &Path) -> Result<bool> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        if entry.path().is_dir() {
            return Ok(true);
        }
    }
    Ok(false)
}
