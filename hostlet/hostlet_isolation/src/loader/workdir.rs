//! Exclusive working directories of a session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hostlet_core::StageError;
use tracing::{debug, warn};

use super::ModuleLayout;

/// The staging and scratch directories of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirs {
    staging: PathBuf,
    scratch: PathBuf,
}

impl WorkingDirs {
    /// Directories under `data_dir` named by `layout`.
    pub fn new(data_dir: &Path, layout: &ModuleLayout) -> Self {
        Self {
            staging: data_dir.join(&layout.staging_dir),
            scratch: data_dir.join(&layout.scratch_dir),
        }
    }

    /// Where the packaged module is copied to.
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Writable scratch space for the guest.
    pub fn scratch(&self) -> &Path {
        &self.scratch
    }

    /// Clear both directories and recreate them empty.
    pub fn prepare(&self) -> Result<(), StageError> {
        reset_dir(&self.staging)?;
        reset_dir(&self.scratch)?;
        debug!(
            staging = %self.staging.display(),
            scratch = %self.scratch.display(),
            "working directories prepared"
        );
        Ok(())
    }
}

fn reset_dir(path: &Path) -> Result<(), StageError> {
    if fs::symlink_metadata(path).is_ok() {
        if let Err(e) = fs::remove_dir_all(path) {
            warn!(path = %path.display(), error = %e, "clear failed, forcing delete");
            force_remove(path).map_err(|source| StageError::ClearFailed {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    fs::create_dir_all(path).map_err(|source| StageError::CreateFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Walk the tree, make every entry writable and delete it bottom-up.
fn force_remove(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if !meta.is_dir() {
        let _ = make_writable(path, false);
        return fs::remove_file(path);
    }

    let _ = make_writable(path, true);
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            force_remove(&entry.path())?;
        } else {
            let _ = make_writable(&entry.path(), false);
            fs::remove_file(entry.path())?;
        }
    }
    fs::remove_dir(path)
}

#[cfg(unix)]
fn make_writable(path: &Path, is_dir: bool) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if is_dir { 0o700 } else { 0o600 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn make_writable(path: &Path, _is_dir: bool) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    fs::set_permissions(path, perms)
}
