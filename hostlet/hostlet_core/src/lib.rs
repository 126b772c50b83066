//! # Hostlet Core
//!
//! `hostlet_core` provides the shared building blocks of the hostlet guest
//! module host: error types, identifiers, the data model of a hosted session
//! and the traits that sit at the boundary between the host shell, the guest
//! module and the platform UI.
//!
//! ## Core Principles
//!
//! 1. **Two lifecycles, one bridge**: the host window moves between
//!    foreground and background independently of the guest application's
//!    own `NotStarted → Starting → Running → Destroyed` state machine. Only
//!    the lifecycle bridge in `hostlet_runtime` translates one into the other.
//!
//! 2. **Single UI owner**: every view mutation happens on the UI-owning
//!    thread. Guest code never touches host UI state directly; it enqueues
//!    requests through the capability surface defined in [`traits::guest`].
//!
//! 3. **Guest code is untrusted**: startup and destroy hooks run on worker
//!    threads, and their failures are converted into typed errors instead of
//!    tearing down the host.
//!
//! ## Crate Structure
//!
//! - **error**: Error taxonomy for session start and guest failures
//! - **id**: Strongly-typed identifier types
//! - **traits**: Guest, host window and input overlay interfaces
//! - **types**: Manifest, entry points, states, displayables and commands
//! - **utils**: Logging helpers

pub mod error;
pub mod id;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export key types and traits for convenience
pub use error::{
    ClassLoadError, GuestError, ManifestError, Result, SessionError, StageError,
};
pub use id::{DisplayableId, SessionId};
pub use traits::{
    ChromeState, DisplayCapability, GuestApplication, GuestContext, GuestFactory, HostDialogs,
    HostShell, HostWindow, InputOverlay, LifecycleCapability, OverlayEditMode,
};
pub use types::{
    CommandEntry, CommandId, CommandKind, CommandListener, CommandSet, Displayable,
    DisplayableContent, DisplayableKind, EntryPointDescriptor, GuestApplicationState,
    HostVisibility, LaunchParams, ModuleManifest, Orientation, TerminationReason,
};
pub use utils::LogLevel;
