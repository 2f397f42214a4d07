//! Run-scoped variable store
//!
//! One store belongs to exactly one pipeline run (or one interactive
//! session); there is no shared global store and therefore no locking.

use serde::Serialize;
use std::collections::BTreeMap;

/// Mapping from variable name to produced artifact text.
///
/// `set` overwrites silently: that is the mechanism by which an interactive
/// user edit supersedes a machine-generated artifact. Keys are never removed
/// during a run, and presence (never type) is what gets checked.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VariableStore {
    bindings: BTreeMap<String, String>,
}

impl VariableStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current value bound to `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.bindings.get(key).map(String::as_str)
    }

    /// Bind `key` to `value`, silently replacing any existing binding.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.bindings.insert(key.into(), value.into());
    }

    /// Whether `key` is currently bound.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Owned copy of every binding, for persistence or export.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.bindings.clone()
    }

    /// Number of bound keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the store has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
