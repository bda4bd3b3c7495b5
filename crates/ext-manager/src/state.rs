//! Persisted installed-state store.
//!
//! A JSON object mapping identifier to a boolean: `true` = enabled, `false`
//! = explicitly disabled, absent = never installed. Absence is NOT enabled:
//! [`InstalledStateStore::is_disabled`] is true for absent keys too.
//!
//! Mutations take an advisory file lock, re-read the file, apply the
//! change, and rewrite it wholesale, so concurrent processes serialize
//! their read-modify-write cycles instead of losing each other's updates.
//! Plain reads serve from the in-memory map loaded at construction (and
//! refreshed by each mutation).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ext_fs::{FileLock, write_atomic};

use crate::error::{Error, Result};
use crate::ident;

/// Installed/disabled state per extension identifier, persisted to a JSON
/// file owned exclusively by the installation manager.
#[derive(Debug)]
pub struct InstalledStateStore {
    path: PathBuf,
    entries: BTreeMap<String, bool>,
}

impl InstalledStateStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. A corrupt file is logged and
    /// treated as empty rather than blocking startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self { path, entries }
    }

    /// Whether an extension is disabled.
    ///
    /// True when the name is malformed, the key is absent (never
    /// installed), or the persisted value is `false`.
    pub fn is_disabled(&self, identifier: &str) -> bool {
        ident::check_name(identifier).is_none()
            || !self.entries.get(identifier).copied().unwrap_or(false)
    }

    /// The raw tri-state entry: `Some(true)` enabled, `Some(false)`
    /// explicitly disabled, `None` never installed.
    pub fn get(&self, identifier: &str) -> Option<bool> {
        self.entries.get(identifier).copied()
    }

    /// Record an extension as enabled or disabled, rewriting the file.
    pub fn set(&mut self, identifier: &str, enabled: bool) -> Result<()> {
        self.mutate(|entries| {
            entries.insert(identifier.to_string(), enabled);
        })
    }

    /// Remove an identifier entirely, rewriting the file. A subsequent
    /// lookup behaves as "never installed".
    pub fn remove(&mut self, identifier: &str) -> Result<()> {
        self.mutate(|entries| {
            entries.remove(identifier);
        })
    }

    /// Number of persisted entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a mutation as a locked read-modify-write cycle: acquire the
    /// lock, re-read the file (picking up other processes' writes), apply,
    /// rewrite. The in-memory map ends up matching the file.
    fn mutate(&mut self, apply: impl FnOnce(&mut BTreeMap<String, bool>)) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;

        self.entries = read_entries(&self.path);
        apply(&mut self.entries);

        let content = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| Error::StateSerialize(e.to_string()))?;
        write_atomic(&self.path, &content)?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, bool> {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Corrupt installed-state file, starting empty"
                );
                BTreeMap::new()
            }
        },
        Err(_) => BTreeMap::new(),
    }
}
