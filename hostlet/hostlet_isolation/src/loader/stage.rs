//! Staging the packaged module.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hostlet_core::StageError;
use tracing::debug;

/// Copies a file into the working area.
pub trait FileStager: Send + Sync {
    /// Copy `from` to `to`, returning the number of bytes written.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;
}

/// [`FileStager`] backed by `std::fs::copy`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStager;

impl FileStager for FsStager {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        fs::copy(from, to)
    }
}

/// Copy `module` into `staging_dir`, keeping its file name.
pub(crate) fn stage_module(
    stager: &dyn FileStager,
    module: &Path,
    staging_dir: &Path,
) -> Result<PathBuf, StageError> {
    if !module.is_file() {
        return Err(StageError::ModuleMissing(module.to_path_buf()));
    }

    let target = match module.file_name() {
        Some(name) => staging_dir.join(name),
        None => return Err(StageError::ModuleMissing(module.to_path_buf())),
    };

    let bytes = stager
        .copy(module, &target)
        .map_err(|source| StageError::CopyFailed {
            from: module.to_path_buf(),
            to: target.clone(),
            source,
        })?;
    debug!(target = %target.display(), bytes, "module staged");
    Ok(target)
}
