//! Loading discovered packages into the registry.

use std::path::Path;

use crate::descriptor::PackageDescriptor;
use crate::discover;
use crate::error::{Error, Result};
use crate::extension::ExtensionRegistrar;
use crate::ident;
use crate::manifest::{self, PackageManifest};
use crate::registry::PackageRegistry;
use crate::state::InstalledStateStore;

/// Load a single package into the registry.
///
/// Returns `Ok(None)` for a malformed identifier or when no manifest exists
/// at `path` — "no package here" is a silent skip. A manifest that fails to
/// parse, or one without a registered extension factory, is a malformed
/// package and fails loudly.
///
/// Loading an already-present identifier returns the existing descriptor
/// without re-invoking the factory.
pub fn load<'r>(
    registry: &'r mut PackageRegistry,
    state: &InstalledStateStore,
    registrar: &ExtensionRegistrar,
    identifier: &str,
    path: &Path,
) -> Result<Option<&'r PackageDescriptor>> {
    if ident::check_name(identifier).is_none() {
        tracing::debug!(identifier, "Skipping extension with malformed name");
        return Ok(None);
    }

    if registry.contains(identifier) {
        return Ok(registry.get(identifier));
    }

    let manifest_path = match manifest::find_manifest(path) {
        Some(p) => p,
        None => return Ok(None),
    };
    let manifest = PackageManifest::from_path(&manifest_path)?;

    let extension = registrar
        .instantiate(identifier)
        .ok_or_else(|| Error::MissingRegistration {
            identifier: identifier.to_string(),
        })?;

    let mut descriptor = PackageDescriptor::new(identifier, path, manifest, extension);
    descriptor.disabled = state.is_disabled(identifier);

    Ok(Some(registry.insert(descriptor)))
}

/// Discover and load every package under the packages root.
///
/// Per-package failures are logged and skipped so one malformed package
/// cannot block the rest from loading.
pub fn load_all(
    registry: &mut PackageRegistry,
    state: &InstalledStateStore,
    registrar: &ExtensionRegistrar,
    root: &Path,
) -> Result<()> {
    for discovered in discover::scan(root)? {
        let identifier = discovered.identifier();
        if let Err(e) = load(registry, state, registrar, &identifier, &discovered.path) {
            tracing::warn!(
                identifier = %identifier,
                error = %e,
                "Failed to load extension, skipping"
            );
        }
    }

    tracing::debug!(count = registry.len(), "Loaded extensions");
    Ok(())
}
