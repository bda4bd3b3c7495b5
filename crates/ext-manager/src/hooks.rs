//! Framework registrar hooks.
//!
//! The web framework owns configuration, views, localization, and routing;
//! the extension manager only tells it what to wire for each package. Hosts
//! implement [`FrameworkHooks`]; [`NullHooks`] is a no-op implementation for
//! headless use and tests.

use std::path::Path;

/// Registrar callbacks invoked while registering a package.
pub trait FrameworkHooks {
    /// Register a localization namespace for the package's `language/`
    /// directory. Called even for disabled packages, so their translated
    /// strings stay resolvable.
    fn add_locale_namespace(&mut self, namespace: &str, path: &Path);

    /// Register a bundled third-party dependency directory (`vendor/`).
    fn register_autoload(&mut self, path: &Path);

    /// Merge the package's `config/` directory into the given configuration
    /// namespace. Not called when [`config_is_frozen`](Self::config_is_frozen)
    /// reports true.
    fn merge_config_namespace(&mut self, namespace: &str, path: &Path);

    /// Whether configuration is cached/frozen, making merges a no-op.
    fn config_is_frozen(&self) -> bool {
        false
    }

    /// Register a view-template namespace for the package's `views/`
    /// directory.
    fn add_view_namespace(&mut self, namespace: &str, path: &Path);

    /// Load the package's routes file.
    fn load_routes(&mut self, identifier: &str, path: &Path);
}

/// Hooks implementation that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHooks;

impl FrameworkHooks for NullHooks {
    fn add_locale_namespace(&mut self, _namespace: &str, _path: &Path) {}

    fn register_autoload(&mut self, _path: &Path) {}

    fn merge_config_namespace(&mut self, _namespace: &str, _path: &Path) {}

    fn add_view_namespace(&mut self, _namespace: &str, _path: &Path) {}

    fn load_routes(&mut self, _identifier: &str, _path: &Path) {}
}
