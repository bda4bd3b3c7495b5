//! The extension capability trait and its factory table.
//!
//! Every discoverable package must have a registration object implementing
//! [`Extension`]. Factories are registered explicitly against the package
//! identifier; the loader resolves them through this table instead of
//! constructing objects by naming convention.

use std::collections::HashMap;

/// Registration object for one extension.
///
/// Hook bodies default to no-ops so metadata-only extensions can register a
/// unit struct.
pub trait Extension {
    /// Register phase: bind services before any extension boots.
    fn register(&self) {}

    /// Boot phase: runs after every extension has registered.
    fn boot(&self) {}

    /// Value contributed to a named registration collection (payment
    /// gateways, mail templates, permissions, ...). `None` when the
    /// extension contributes nothing under that name.
    fn registration_values(&self, method: &str) -> Option<serde_json::Value> {
        let _ = method;
        None
    }
}

/// A registration object with no behavior, for metadata-only packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExtension;

impl Extension for NullExtension {}

type Factory = Box<dyn Fn() -> Box<dyn Extension>>;

/// Factory table mapping identifiers to extension constructors.
///
/// Populated once by the host application before the manager initializes.
#[derive(Default)]
pub struct ExtensionRegistrar {
    factories: HashMap<String, Factory>,
}

impl ExtensionRegistrar {
    /// Create an empty registrar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for an identifier, replacing any existing entry.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Extension> + 'static,
    {
        self.factories.insert(identifier.into(), Box::new(factory));
    }

    /// Whether a factory is registered for the identifier.
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Instantiate the extension for an identifier.
    pub fn instantiate(&self, identifier: &str) -> Option<Box<dyn Extension>> {
        self.factories.get(identifier).map(|f| f())
    }
}

impl std::fmt::Debug for ExtensionRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistrar")
            .field("identifiers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
