//! Guest-side contract.
//!
//! A guest module is any type implementing [`GuestApplication`], made
//! available to the host through a [`GuestFactory`] registered under its
//! class name. The factory receives a [`GuestContext`], the guest's only
//! handle into the host.
//!
//! # Threading
//!
//! - `start` runs on the dedicated `guest-startup` worker thread.
//! - `destroy` runs on a dedicated `guest-destroy` worker thread.
//! - `pause`, `resume` and `stopped` run synchronously on the UI-owning
//!   thread and must return quickly.
//! - Command listeners run on the session's `guest-events` thread.
//!
//! Panics in any hook are caught by the host and treated like returned
//! errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::GuestError;
use crate::id::SessionId;
use crate::types::{Displayable, ModuleManifest};

/// A startable guest application.
pub trait GuestApplication: Send + Sync {
    /// Startup hook. Returning normally moves the session to `Running`.
    fn start(&self) -> Result<(), GuestError>;

    /// The host went to the background.
    fn pause(&self) {}

    /// The host came back to the foreground.
    fn resume(&self) {}

    /// The host window is no longer visible at all.
    fn stopped(&self) {}

    /// Teardown hook. Errors are logged and otherwise ignored.
    fn destroy(&self) -> Result<(), GuestError>;
}

/// Builds a guest instance for one session.
pub type GuestFactory =
    Arc<dyn Fn(GuestContext) -> Result<Arc<dyn GuestApplication>, GuestError> + Send + Sync>;

/// Presentation calls a guest may make from any thread.
pub trait DisplayCapability: Send + Sync {
    /// Request that `displayable` becomes the current one. Returns
    /// immediately; the swap happens later on the UI-owning thread.
    fn set_current(&self, displayable: Arc<Displayable>);

    /// The most recently requested displayable.
    fn current(&self) -> Option<Arc<Displayable>>;

    /// Whether the host window is in the foreground.
    fn is_host_visible(&self) -> bool;
}

/// Lifecycle calls a guest may make.
pub trait LifecycleCapability: Send + Sync {
    /// The guest is done and asks the host to tear it down without
    /// confirmation.
    fn request_termination(&self);
}

/// Everything a guest instance can reach in the host.
#[derive(Clone)]
pub struct GuestContext {
    session_id: SessionId,
    namespace: String,
    properties: Arc<ModuleManifest>,
    resource_dir: PathBuf,
    scratch_dir: Option<PathBuf>,
    display: Arc<dyn DisplayCapability>,
    lifecycle: Arc<dyn LifecycleCapability>,
}

impl GuestContext {
    /// Assemble a context. Called by the host's load context.
    pub fn new(
        session_id: SessionId,
        namespace: impl Into<String>,
        properties: Arc<ModuleManifest>,
        resource_dir: PathBuf,
        display: Arc<dyn DisplayCapability>,
        lifecycle: Arc<dyn LifecycleCapability>,
    ) -> Self {
        Self {
            session_id,
            namespace: namespace.into(),
            properties,
            resource_dir,
            scratch_dir: None,
            display,
            lifecycle,
        }
    }

    /// Give the guest a writable directory, exclusive to its session.
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = Some(dir);
        self
    }

    /// Session this guest belongs to.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Per-session namespace the guest was loaded into.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up a manifest property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// All manifest properties.
    pub fn properties(&self) -> &ModuleManifest {
        &self.properties
    }

    /// Directory holding the module's resources.
    pub fn resource_dir(&self) -> &Path {
        &self.resource_dir
    }

    /// Path of a named resource. Leading slashes are ignored so
    /// `"/icon.png"` and `"icon.png"` resolve the same way.
    pub fn resource_path(&self, name: &str) -> PathBuf {
        self.resource_dir.join(name.trim_start_matches('/'))
    }

    /// Writable session directory, cleared before every session.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }

    /// Presentation capability.
    pub fn display(&self) -> &Arc<dyn DisplayCapability> {
        &self.display
    }

    /// Ask the host to end the session.
    pub fn request_termination(&self) {
        self.lifecycle.request_termination();
    }
}

impl std::fmt::Debug for GuestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestContext")
            .field("session_id", &self.session_id)
            .field("namespace", &self.namespace)
            .field("resource_dir", &self.resource_dir)
            .field("scratch_dir", &self.scratch_dir)
            .finish()
    }
}
