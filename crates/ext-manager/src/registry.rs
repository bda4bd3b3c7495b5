//! Insertion-ordered registry of loaded packages.

use std::collections::HashMap;

use crate::descriptor::PackageDescriptor;

/// Registry of loaded packages keyed by identifier.
///
/// Iteration order is insertion order, which is discovery order (lexical by
/// vendor, then by package). Downstream tie-breaking in the topological sort
/// depends on this ordering.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    order: Vec<String>,
    entries: HashMap<String, PackageDescriptor>,
}

impl PackageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor.
    ///
    /// Re-inserting an already-present identifier is a no-op: the new
    /// descriptor is dropped and the existing entry is returned.
    pub fn insert(&mut self, descriptor: PackageDescriptor) -> &PackageDescriptor {
        let identifier = descriptor.identifier.clone();
        if !self.entries.contains_key(&identifier) {
            self.order.push(identifier.clone());
            self.entries.insert(identifier.clone(), descriptor);
        }
        &self.entries[&identifier]
    }

    /// Look up a package by identifier.
    pub fn get(&self, identifier: &str) -> Option<&PackageDescriptor> {
        self.entries.get(identifier)
    }

    /// Whether a package is present (disabled or not).
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// All identifiers in insertion order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// All descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PackageDescriptor> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Identifiers of enabled packages, in insertion order.
    pub fn enabled_identifiers(&self) -> Vec<String> {
        self.iter()
            .filter(|d| !d.disabled)
            .map(|d| d.identifier.clone())
            .collect()
    }

    /// Set the disabled flag on a package. Returns false when the
    /// identifier is unknown.
    pub fn set_disabled(&mut self, identifier: &str, disabled: bool) -> bool {
        match self.entries.get_mut(identifier) {
            Some(descriptor) => {
                descriptor.disabled = disabled;
                true
            }
            None => false,
        }
    }

    /// Number of loaded packages.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
