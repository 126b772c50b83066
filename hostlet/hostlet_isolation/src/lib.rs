//! # Hostlet Isolation
//!
//! `hostlet_isolation` turns a guest module directory into something the
//! host can start:
//!
//! 1. **Manifest**: the module descriptor is read into an ordered
//!    [`ModuleManifest`](hostlet_core::ModuleManifest) and its numbered
//!    entry points are extracted.
//!
//! 2. **Working directories**: a staging and a scratch directory, exclusive
//!    to the session, are cleared and recreated before every load.
//!
//! 3. **Staging**: the packaged module is copied into the staging directory.
//!
//! 4. **Load context**: a per-session namespace parented to the host's
//!    [`GuestRegistry`]. Host-registered guest factories stay resolvable;
//!    classes packaged in the module are defined inside the context and are
//!    invisible to every other session.

pub mod context;
pub mod loader;

// Re-export key types for convenience
pub use context::{GuestRegistry, LoadContext, PackagedClasses};
pub use loader::{
    entry_points, FileStager, FsStager, KeyValueManifestReader, LoadedModule, ManifestReader,
    ModuleLayout, ModuleLoader, WorkingDirs,
};
