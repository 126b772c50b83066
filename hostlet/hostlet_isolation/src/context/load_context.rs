//! Per-session load context.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hostlet_concurrency::run_guarded;
use hostlet_core::{
    ClassLoadError, DisplayCapability, GuestApplication, GuestContext, GuestFactory,
    LifecycleCapability, ModuleManifest, SessionId,
};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::GuestRegistry;

/// Isolated class resolution scope of one session.
///
/// Resolution asks the parent registry first and then the factories
/// defined in this context. Definitions made here are never visible to
/// another context.
pub struct LoadContext {
    session_id: SessionId,
    namespace: String,
    parent: Arc<GuestRegistry>,
    local: RwLock<HashMap<String, GuestFactory>>,
    instances: Mutex<Vec<String>>,
    staged_module: PathBuf,
    scratch_dir: PathBuf,
    resource_dir: PathBuf,
    discarded: AtomicBool,
}

impl LoadContext {
    /// Create a context for `session_id`.
    pub fn new(
        session_id: SessionId,
        parent: Arc<GuestRegistry>,
        staged_module: PathBuf,
        scratch_dir: PathBuf,
        resource_dir: PathBuf,
    ) -> Self {
        Self {
            namespace: format!("session-{}", session_id.short()),
            session_id,
            parent,
            local: RwLock::new(HashMap::new()),
            instances: Mutex::new(Vec::new()),
            staged_module,
            scratch_dir,
            resource_dir,
            discarded: AtomicBool::new(false),
        }
    }

    /// Owning session.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Namespace name, unique per session.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Staged copy of the packaged module.
    pub fn staged_module(&self) -> &Path {
        &self.staged_module
    }

    /// Scratch directory of the session.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Resource directory of the module.
    pub fn resource_dir(&self) -> &Path {
        &self.resource_dir
    }

    /// Define a factory visible only inside this context. The loader calls
    /// this for every class packaged in the module.
    pub fn define(
        &self,
        class_name: impl Into<String>,
        factory: GuestFactory,
    ) -> Result<(), ClassLoadError> {
        let class_name = class_name.into();
        self.ensure_live(&class_name)?;
        debug!(namespace = %self.namespace, class = %class_name, "class defined");
        self.local.write().insert(class_name, factory);
        Ok(())
    }

    /// Resolve `class_name`, parent registry first.
    pub fn resolve(&self, class_name: &str) -> Result<GuestFactory, ClassLoadError> {
        self.ensure_live(class_name)?;
        self.parent
            .resolve(class_name)
            .or_else(|| self.local.read().get(class_name).cloned())
            .ok_or_else(|| ClassLoadError::NotFound(class_name.to_string()))
    }

    /// Resolve `class_name` and build an instance wired to the given
    /// capabilities. A factory error or panic is an instantiation failure.
    pub fn instantiate(
        &self,
        class_name: &str,
        properties: Arc<ModuleManifest>,
        display: Arc<dyn DisplayCapability>,
        lifecycle: Arc<dyn LifecycleCapability>,
    ) -> Result<Arc<dyn GuestApplication>, ClassLoadError> {
        let factory = self.resolve(class_name)?;
        let context = GuestContext::new(
            self.session_id,
            self.namespace.clone(),
            properties,
            self.resource_dir.clone(),
            display,
            lifecycle,
        )
        .with_scratch_dir(self.scratch_dir.clone());

        let guest = run_guarded(|| factory(context)).map_err(|e| ClassLoadError::Instantiation {
            class: class_name.to_string(),
            reason: e.to_string(),
        })?;

        self.instances.lock().push(class_name.to_string());
        info!(namespace = %self.namespace, class = %class_name, "guest instantiated");
        Ok(guest)
    }

    /// Classes instantiated through this context.
    pub fn instances(&self) -> Vec<String> {
        self.instances.lock().clone()
    }

    /// Whether [`LoadContext::discard`] was called.
    pub fn is_discarded(&self) -> bool {
        self.discarded.load(Ordering::Acquire)
    }

    /// Drop every local definition and instance record. Later resolution
    /// fails with [`ClassLoadError::ContextDiscarded`].
    pub fn discard(&self) {
        if self.discarded.swap(true, Ordering::AcqRel) {
            return;
        }
        self.local.write().clear();
        self.instances.lock().clear();
        debug!(namespace = %self.namespace, "load context discarded");
    }

    fn ensure_live(&self, class_name: &str) -> Result<(), ClassLoadError> {
        if self.is_discarded() {
            return Err(ClassLoadError::ContextDiscarded(class_name.to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadContext")
            .field("namespace", &self.namespace)
            .field("staged_module", &self.staged_module)
            .field("discarded", &self.is_discarded())
            .finish()
    }
}
