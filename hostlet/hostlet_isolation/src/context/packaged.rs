//! Guest classes shipped inside the module itself.

use std::path::Path;

use hostlet_core::{ClassLoadError, GuestFactory, ModuleManifest};

/// Reads the guest classes packaged in a staged module.
///
/// The loader defines every class returned here in the session's
/// [`LoadContext`](super::LoadContext), so they resolve for that session
/// only and never shadow a host-registered class.
pub trait PackagedClasses: Send + Sync {
    /// Classes packaged in `staged_module`, described by `manifest`.
    fn classes(
        &self,
        staged_module: &Path,
        manifest: &ModuleManifest,
    ) -> Result<Vec<(String, GuestFactory)>, ClassLoadError>;
}
