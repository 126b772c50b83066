//! Error types for the hostlet guest module host.
//!
//! Errors are grouped by the stage of a session that produces them. The root
//! type, [`SessionError`], wraps each of them and is what the host shell
//! surfaces to the user. Four variants are session-start failures (see
//! [`SessionError::is_session_start_failure`]); they are shown in a single
//! blocking error dialog and end the session once dismissed.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::GuestApplicationState;

/// Result alias used across the hostlet crates.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Root error type for a hosted session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The module descriptor is missing or corrupt
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// The manifest declares no entry point
    #[error("No entry point declared in manifest {0}")]
    EntryNotFound(PathBuf),

    /// The guest module could not be staged into the working area
    #[error("Module stage error: {0}")]
    ModuleStage(#[from] StageError),

    /// The selected entry could not be resolved or instantiated
    #[error("Class load error: {0}")]
    ClassLoad(#[from] ClassLoadError),

    /// The guest startup hook failed
    #[error("Guest startup failed: {0}")]
    Startup(GuestError),

    /// The guest signalled that it is done
    #[error("Guest requested termination")]
    GuestRequestedTermination,

    /// The entry selection prompt was dismissed without a choice
    #[error("Entry selection cancelled")]
    Cancelled,

    /// A lifecycle transition was requested from an incompatible state
    #[error("Invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        /// State the bridge was in
        from: GuestApplicationState,
        /// State that was requested
        to: GuestApplicationState,
    },

    /// An event channel between the UI-owning thread and the guest is gone
    #[error("Event channel closed")]
    ChannelClosed,
}

impl SessionError {
    /// Whether this error aborts session start and must be shown in the
    /// blocking error dialog.
    pub fn is_session_start_failure(&self) -> bool {
        matches!(
            self,
            Self::Manifest(_) | Self::EntryNotFound(_) | Self::ModuleStage(_) | Self::ClassLoad(_)
        )
    }
}

/// Errors raised while reading the module descriptor.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The descriptor file does not exist
    #[error("Manifest not found: {0}")]
    NotFound(PathBuf),

    /// The descriptor file could not be read
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        /// Descriptor path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A line is neither a key/value pair, a comment nor a continuation
    #[error("Malformed manifest line {line}: {content:?}")]
    Malformed {
        /// One-based line number
        line: usize,
        /// Offending line
        content: String,
    },

    /// A numbered entry value is not a `DisplayName, ClassName` pair
    #[error("Invalid entry point {key}: {value:?}")]
    InvalidEntry {
        /// Manifest key, e.g. `Entry-1`
        key: String,
        /// Raw value
        value: String,
    },
}

/// Errors raised while preparing the working directories or copying the
/// packaged module.
#[derive(Debug, Error)]
pub enum StageError {
    /// The packaged module file is absent from the module root
    #[error("Packaged module not found: {0}")]
    ModuleMissing(PathBuf),

    /// Existing working directory content could not be removed, even by
    /// force
    #[error("Failed to clear working directory {path}: {source}")]
    ClearFailed {
        /// Working directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A working directory could not be created
    #[error("Failed to create working directory {path}: {source}")]
    CreateFailed {
        /// Working directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Copying the module into the staging directory failed
    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        /// Source file
        from: PathBuf,
        /// Destination file
        to: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while resolving or instantiating an entry class.
#[derive(Debug, Error)]
pub enum ClassLoadError {
    /// No factory is registered under the class name
    #[error("Class not found: {0}")]
    NotFound(String),

    /// The factory refused to build an instance
    #[error("Failed to instantiate {class}: {reason}")]
    Instantiation {
        /// Requested class name
        class: String,
        /// Failure message from the factory
        reason: String,
    },

    /// The load context was discarded at session end
    #[error("Load context {0} has been discarded")]
    ContextDiscarded(String),
}

/// Failure reported by guest code, either as a returned error or a panic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuestError {
    /// The hook returned an error
    #[error("{0}")]
    Failed(String),

    /// The hook panicked
    #[error("guest panicked: {0}")]
    Panicked(String),
}

impl GuestError {
    /// Build a [`GuestError::Failed`] from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Convert a panic payload caught with `catch_unwind` into an error.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<unknown panic>".to_string()
        };
        Self::Panicked(message)
    }
}
