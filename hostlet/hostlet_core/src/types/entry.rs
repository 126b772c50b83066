//! Entry point descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ManifestError;

/// Prefix of numbered entry-point keys (`Entry-1`, `Entry-2`, ...).
pub const ENTRY_KEY_PREFIX: &str = "Entry-";

/// A startable unit declared by the guest module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPointDescriptor {
    /// Name shown in the selection prompt
    pub display_name: String,

    /// Fully qualified class name resolved through the load context
    pub class_name: String,
}

impl EntryPointDescriptor {
    /// Create a descriptor.
    pub fn new(display_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            class_name: class_name.into(),
        }
    }

    /// Whether a manifest key names an entry point (`Entry-` followed by one
    /// or more ASCII digits, nothing else).
    pub fn is_entry_key(key: &str) -> bool {
        key.strip_prefix(ENTRY_KEY_PREFIX)
            .map(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false)
    }

    /// Parse a `DisplayName, ClassName` value.
    ///
    /// The display name is the text before the first comma and the class
    /// name the text after the last one, so optional middle fields (an icon
    /// path, typically) are ignored.
    pub fn parse(key: &str, value: &str) -> Result<Self, ManifestError> {
        let invalid = || ManifestError::InvalidEntry {
            key: key.to_string(),
            value: value.to_string(),
        };

        let first = value.find(',').ok_or_else(invalid)?;
        let last = value.rfind(',').ok_or_else(invalid)?;
        let display_name = value[..first].trim();
        let class_name = value[last + 1..].trim();
        if class_name.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(display_name, class_name))
    }
}

impl fmt::Display for EntryPointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.class_name)
    }
}
