//! Module loading.
//!
//! [`ModuleLoader::load`] reads the module descriptor, derives the entry
//! points, prepares the session's working directories, stages the packaged
//! module and builds the session's [`LoadContext`], defining in it the
//! classes the staged module packages.

mod manifest;
mod stage;
mod workdir;

pub use manifest::{KeyValueManifestReader, ManifestReader};
pub use stage::{FileStager, FsStager};
pub use workdir::WorkingDirs;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hostlet_core::{
    EntryPointDescriptor, ManifestError, ModuleManifest, Result, SessionError, SessionId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::{GuestRegistry, LoadContext, PackagedClasses};

/// File and directory names of a guest module and of the host's working
/// area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLayout {
    /// Descriptor file, relative to the module root
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Packaged module, relative to the module root
    #[serde(default = "default_module_file")]
    pub module_file: String,

    /// Resource directory, relative to the module root
    #[serde(default = "default_resource_dir")]
    pub resource_dir: String,

    /// Staging directory, relative to the host data directory
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,

    /// Scratch directory, relative to the host data directory
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,
}

fn default_manifest_file() -> String {
    "MANIFEST.MF".to_string()
}

fn default_module_file() -> String {
    "module.bin".to_string()
}

fn default_resource_dir() -> String {
    "res".to_string()
}

fn default_staging_dir() -> String {
    "module_staging".to_string()
}

fn default_scratch_dir() -> String {
    "module_scratch".to_string()
}

impl Default for ModuleLayout {
    fn default() -> Self {
        Self {
            manifest_file: default_manifest_file(),
            module_file: default_module_file(),
            resource_dir: default_resource_dir(),
            staging_dir: default_staging_dir(),
            scratch_dir: default_scratch_dir(),
        }
    }
}

/// Extract the `Entry-<n>` descriptors of a manifest, in manifest order.
pub fn entry_points(
    manifest: &ModuleManifest,
) -> std::result::Result<Vec<EntryPointDescriptor>, ManifestError> {
    manifest
        .iter()
        .filter(|(key, _)| EntryPointDescriptor::is_entry_key(key))
        .map(|(key, value)| EntryPointDescriptor::parse(key, value))
        .collect()
}

/// A module ready to be started.
#[derive(Debug)]
pub struct LoadedModule {
    /// Parsed descriptor, shared with the guest as its properties
    pub manifest: Arc<ModuleManifest>,

    /// Declared entry points, never empty
    pub entries: Vec<EntryPointDescriptor>,

    /// Isolated load context of the session
    pub context: LoadContext,

    /// Working directories of the session
    pub dirs: WorkingDirs,

    /// Display name of the module
    pub module_name: String,
}

/// Loads guest modules for host sessions.
pub struct ModuleLoader {
    data_dir: PathBuf,
    layout: ModuleLayout,
    registry: Arc<GuestRegistry>,
    reader: Box<dyn ManifestReader>,
    stager: Box<dyn FileStager>,
    packaged: Option<Box<dyn PackagedClasses>>,
}

impl ModuleLoader {
    /// Loader using the default reader and stager.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        layout: ModuleLayout,
        registry: Arc<GuestRegistry>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            layout,
            registry,
            reader: Box::new(KeyValueManifestReader),
            stager: Box::new(FsStager),
            packaged: None,
        }
    }

    /// Replace the manifest reader.
    pub fn with_manifest_reader(mut self, reader: impl ManifestReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// Replace the file stager.
    pub fn with_stager(mut self, stager: impl FileStager + 'static) -> Self {
        self.stager = Box::new(stager);
        self
    }

    /// Read module-packaged classes with `packaged` after staging.
    pub fn with_packaged_classes(mut self, packaged: impl PackagedClasses + 'static) -> Self {
        self.packaged = Some(Box::new(packaged));
        self
    }

    /// Module layout in use.
    pub fn layout(&self) -> &ModuleLayout {
        &self.layout
    }

    /// Read the descriptor of the module at `root`.
    pub fn read_manifest(
        &self,
        root: &Path,
    ) -> std::result::Result<ModuleManifest, ManifestError> {
        self.reader.read(&root.join(&self.layout.manifest_file))
    }

    /// Load the module at `root` for `session_id`.
    ///
    /// Nothing on disk is touched when the descriptor is unusable or
    /// declares no entry point.
    pub fn load(&self, root: &Path, session_id: SessionId) -> Result<LoadedModule> {
        let manifest = self.read_manifest(root)?;
        let entries = entry_points(&manifest)?;
        if entries.is_empty() {
            return Err(SessionError::EntryNotFound(
                root.join(&self.layout.manifest_file),
            ));
        }

        let dirs = WorkingDirs::new(&self.data_dir, &self.layout);
        dirs.prepare()?;
        let staged = stage::stage_module(
            self.stager.as_ref(),
            &root.join(&self.layout.module_file),
            dirs.staging(),
        )?;

        let module_name = manifest
            .module_name()
            .map(str::to_string)
            .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();

        let context = LoadContext::new(
            session_id,
            Arc::clone(&self.registry),
            staged,
            dirs.scratch().to_path_buf(),
            root.join(&self.layout.resource_dir),
        );

        let mut packaged_classes = 0;
        if let Some(packaged) = &self.packaged {
            for (class_name, factory) in packaged.classes(context.staged_module(), &manifest)? {
                context.define(class_name, factory)?;
                packaged_classes += 1;
            }
        }

        info!(
            session = %session_id,
            module = %module_name,
            entries = entries.len(),
            packaged_classes,
            namespace = %context.namespace(),
            "module loaded"
        );

        Ok(LoadedModule {
            manifest: Arc::new(manifest),
            entries,
            context,
            dirs,
            module_name,
        })
    }
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("data_dir", &self.data_dir)
            .field("layout", &self.layout)
            .finish()
    }
}
