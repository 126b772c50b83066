//! `hostlet entries`

use std::path::Path;

use anyhow::{Context, Result};
use hostlet_isolation::{entry_points, KeyValueManifestReader, ManifestReader};
use hostlet_runtime::ShellConfig;

/// Print the entry points declared by the module at `module`.
pub fn execute(config: &ShellConfig, module: &Path, json: bool) -> Result<i32> {
    let manifest_path = module.join(&config.layout.manifest_file);
    let manifest = KeyValueManifestReader
        .read(&manifest_path)
        .with_context(|| format!("cannot read module at {}", module.display()))?;
    let entries = entry_points(&manifest)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(0);
    }

    if entries.is_empty() {
        println!("No entry points declared in {}", manifest_path.display());
        return Ok(1);
    }
    if let Some(name) = manifest.module_name() {
        println!("{}", name);
    }
    for (i, entry) in entries.iter().enumerate() {
        println!("{}. {} ({})", i + 1, entry.display_name, entry.class_name);
    }
    Ok(0)
}
