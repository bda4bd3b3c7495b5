//! Dependency resolution and activation ordering.
//!
//! Dependencies are declared in the manifest `require` key and resolved
//! purely by identifier: a dependency is "present" when the identifier
//! exists in the registry, disabled or not. Version constraints are left to
//! the migration runner.

use std::collections::{BTreeMap, HashSet};

use crate::descriptor::PackageDescriptor;
use crate::error::{Error, Result};
use crate::install::InstallationManager;
use crate::registry::PackageRegistry;

/// Ordering rounds allowed before the candidate set is declared cyclic.
const MAX_ORDERING_ROUNDS: usize = 999;

/// Declared dependency identifiers of a package, or `None` when its
/// manifest has no `require` key.
pub fn dependencies_of(descriptor: &PackageDescriptor) -> Option<Vec<String>> {
    descriptor.require_identifiers()
}

/// Declared dependencies of the package with the given identifier.
///
/// Fails with [`Error::UnknownExtension`] when the identifier is not in the
/// registry.
pub fn dependencies_by_id(
    registry: &PackageRegistry,
    identifier: &str,
) -> Result<Option<Vec<String>>> {
    registry
        .get(identifier)
        .map(dependencies_of)
        .ok_or_else(|| Error::UnknownExtension(identifier.to_string()))
}

/// Locate declared dependencies that are not present in the registry.
///
/// Returns dependent identifier -> missing dependency identifiers. Each
/// missing identifier is recorded once globally, against the first
/// dependent (in insertion order) that declares it.
pub fn find_missing(registry: &PackageRegistry) -> BTreeMap<String, Vec<String>> {
    let mut result: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut missing: HashSet<String> = HashSet::new();

    for descriptor in registry.iter() {
        let Some(required) = dependencies_of(descriptor) else {
            continue;
        };

        for require in required {
            if registry.contains(&require) {
                continue;
            }
            if missing.insert(require.clone()) {
                result
                    .entry(descriptor.identifier.clone())
                    .or_default()
                    .push(require);
            }
        }
    }

    result
}

/// Disable packages whose declared dependencies are absent or disabled.
///
/// Single pass over insertion order, persisting each newly disabled package
/// through the installation manager. A package disabled earlier in the pass
/// counts as disabled for packages scanned later, but the sweep is not a
/// transitive fixed-point: a chain `a -> b -> c` with only `c` missing
/// disables `b` while leaving `a` enabled until a later sweep runs.
///
/// Returns the identifiers disabled by this pass.
pub fn disable_unmet(
    registry: &mut PackageRegistry,
    installer: &mut InstallationManager,
) -> Result<Vec<String>> {
    let identifiers: Vec<String> = registry.identifiers().map(str::to_string).collect();
    let mut disabled_now = Vec::new();

    for identifier in identifiers {
        let Some(descriptor) = registry.get(&identifier) else {
            continue;
        };
        let Some(required) = dependencies_of(descriptor) else {
            continue;
        };

        let unmet = required
            .iter()
            .any(|require| registry.get(require).is_none_or(|dep| dep.disabled));

        if unmet && !descriptor.disabled {
            tracing::info!(identifier = %identifier, "Disabling extension with unmet dependencies");
            installer.set_installed(registry, &identifier, Some(false))?;
            disabled_now.push(identifier);
        }
    }

    Ok(disabled_now)
}

/// Order packages so dependencies come before their dependents.
///
/// `subset` restricts the candidate set; by default all enabled packages
/// are ordered. Dependencies outside the candidate set are ignored rather
/// than treated as blocking. Ties among simultaneously-ready candidates
/// keep registry insertion order. Fails with [`Error::CyclicDependency`]
/// once [`MAX_ORDERING_ROUNDS`] rounds elapse without emptying the set.
pub fn topological_order(
    registry: &PackageRegistry,
    subset: Option<&[String]>,
) -> Result<Vec<String>> {
    let candidates: Vec<String> = match subset {
        Some(ids) => ids.to_vec(),
        None => registry.enabled_identifiers(),
    };
    let candidate_set: HashSet<&str> = candidates.iter().map(String::as_str).collect();

    let mut result: Vec<String> = Vec::with_capacity(candidates.len());
    let mut checklist = candidates.clone();
    let mut rounds = 0usize;

    while !checklist.is_empty() {
        rounds += 1;
        if rounds > MAX_ORDERING_ROUNDS {
            return Err(Error::CyclicDependency {
                remaining: checklist,
            });
        }

        checklist.retain(|identifier| {
            let depends = registry
                .get(identifier)
                .and_then(dependencies_of)
                .unwrap_or_default();

            let blocked = depends.iter().any(|dep| {
                candidate_set.contains(dep.as_str()) && !result.iter().any(|done| done == dep)
            });
            if blocked {
                return true;
            }

            result.push(identifier.clone());
            false
        });
    }

    Ok(result)
}
