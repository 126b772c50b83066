//! Manifest reading.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use hostlet_core::{ManifestError, ModuleManifest};
use tracing::debug;

/// Reads a module descriptor file.
pub trait ManifestReader: Send + Sync {
    /// Parse the descriptor at `path`.
    fn read(&self, path: &Path) -> Result<ModuleManifest, ManifestError>;
}

/// Reader for textual `Key=Value` descriptors.
///
/// - The separator is whichever of `=` or `:` comes first on the line, so
///   JAR-style `Key: Value` descriptors are read as well.
/// - Blank lines and lines starting with `#` are skipped.
/// - A line starting with a single space continues the previous value.
/// - Keys and values are trimmed; a leading UTF-8 BOM is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyValueManifestReader;

impl KeyValueManifestReader {
    /// Parse descriptor text.
    pub fn parse_str(&self, text: &str) -> Result<ModuleManifest, ManifestError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut pairs: Vec<(String, String)> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            let malformed = || ManifestError::Malformed {
                line: index + 1,
                content: line.to_string(),
            };

            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let (_, value) = pairs.last_mut().ok_or_else(malformed)?;
                value.push_str(continuation.trim_end());
                continue;
            }

            let split = line.find(['=', ':']).ok_or_else(malformed)?;
            let key = line[..split].trim();
            if key.is_empty() {
                return Err(malformed());
            }
            let value = line[split + 1..].trim();
            pairs.push((key.to_string(), value.to_string()));
        }

        Ok(ModuleManifest::from_pairs(pairs))
    }
}

impl ManifestReader for KeyValueManifestReader {
    fn read(&self, path: &Path) -> Result<ModuleManifest, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ManifestError::NotFound(path.to_path_buf()),
            _ => ManifestError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let manifest = self.parse_str(&text)?;
        debug!(path = %path.display(), keys = manifest.len(), "manifest read");
        Ok(manifest)
    }
}
