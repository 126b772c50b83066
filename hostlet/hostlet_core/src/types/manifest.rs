//! Module descriptor.

use serde::{Deserialize, Serialize};

/// Manifest key holding the module's human-readable name.
pub const MODULE_NAME_KEY: &str = "Module-Name";

/// Ordered key/value descriptor of a guest module.
///
/// Keys keep the position of their first occurrence; a repeated key replaces
/// the earlier value in place. The manifest is built once per session and
/// never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    entries: Vec<(String, String)>,
}

impl ModuleManifest {
    /// Build a manifest from pairs in file order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => entries.push((key, value)),
            }
        }
        Self { entries }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over pairs in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The module's declared display name, if any.
    pub fn module_name(&self) -> Option<&str> {
        self.get(MODULE_NAME_KEY)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
