//! Interfaces at the edges of the host.
//!
//! - [`guest`]: what a guest module implements and what it may call back
//!   into.
//! - [`host`]: what the platform UI shell and the input overlay provide.

pub mod guest;
pub mod host;

pub use guest::{
    DisplayCapability, GuestApplication, GuestContext, GuestFactory, LifecycleCapability,
};
pub use host::{ChromeState, HostDialogs, HostShell, HostWindow, InputOverlay, OverlayEditMode};
