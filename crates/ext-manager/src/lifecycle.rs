//! Register and boot lifecycle phases.
//!
//! Each phase runs at most once per manager: `register_all` and `boot_all`
//! are guarded by flags and repeat calls are no-ops, not errors. Single
//! packages can still be registered or booted directly (the install path
//! does this), which the flags do not guard.

use crate::descriptor::PackageDescriptor;
use crate::hooks::FrameworkHooks;
use crate::registry::PackageRegistry;
use crate::{CONFIG_DIR, LANGUAGE_DIR, ROUTES_FILENAME, VENDOR_DIR, VIEWS_DIR};

/// Orchestrates the register and boot phases over the registry.
#[derive(Debug, Default)]
pub struct LifecycleManager {
    registered: bool,
    booted: bool,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the register phase has run.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Whether the boot phase has run.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Run the register phase over every package, once.
    pub fn register_all(&mut self, registry: &PackageRegistry, hooks: &mut dyn FrameworkHooks) {
        if self.registered {
            return;
        }

        for descriptor in registry.iter() {
            self.register_one(descriptor, hooks);
        }

        self.registered = true;
        tracing::debug!(count = registry.len(), "Registered extensions");
    }

    /// Register a single package.
    ///
    /// The locale namespace is wired before the disabled check so that
    /// disabled packages keep their translations resolvable; everything
    /// else is skipped for disabled packages.
    pub fn register_one(&self, descriptor: &PackageDescriptor, hooks: &mut dyn FrameworkHooks) {
        let namespace = descriptor.identifier.to_lowercase();

        let language = descriptor.path.join(LANGUAGE_DIR);
        if language.is_dir() {
            hooks.add_locale_namespace(&namespace, &language);
        }

        if descriptor.disabled {
            return;
        }

        let vendor = descriptor.path.join(VENDOR_DIR);
        if vendor.is_dir() {
            hooks.register_autoload(&vendor);
        }

        descriptor.extension().register();

        let config = descriptor.path.join(CONFIG_DIR);
        if config.is_dir() && !hooks.config_is_frozen() {
            hooks.merge_config_namespace(&namespace, &config);
        }

        let views = descriptor.path.join(VIEWS_DIR);
        if views.is_dir() {
            hooks.add_view_namespace(&descriptor.identifier, &views);
        }

        let routes = descriptor.path.join(ROUTES_FILENAME);
        if routes.is_file() {
            hooks.load_routes(&descriptor.identifier, &routes);
        }
    }

    /// Run the boot phase over every package, once.
    pub fn boot_all(&mut self, registry: &PackageRegistry) {
        if self.booted {
            return;
        }

        for descriptor in registry.iter() {
            self.boot_one(Some(descriptor));
        }

        self.booted = true;
        tracing::debug!(count = registry.len(), "Booted extensions");
    }

    /// Boot a single package. Absent or disabled packages are no-ops.
    pub fn boot_one(&self, descriptor: Option<&PackageDescriptor>) {
        let Some(descriptor) = descriptor else {
            return;
        };
        if descriptor.disabled {
            return;
        }

        descriptor.extension().boot();
    }
}
