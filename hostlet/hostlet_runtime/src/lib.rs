//! Hostlet Runtime - lifecycle bridge and host session
//!
//! This crate connects a loaded guest module to the host window: it picks
//! the entry point, drives the guest's lifecycle hooks on worker threads,
//! marshals displayable changes onto the UI-owning thread and routes the
//! host menu, queueing guest commands onto their own thread.
//!
//! [`HostSession`] is the facade a platform shell talks to.

pub mod bridge;
pub mod session;
pub mod system;

pub use bridge::{
    build_menu, dispatch, CommandAction, Dispatch, DisplayHandle, EntrySelector, GuestEvents,
    HostAction, HostMenu, LifecycleBridge, MenuEntry, PresentationAdapter, Selection, UiEvent,
    DESTROY_THREAD, GUEST_EVENTS_THREAD, STARTUP_THREAD,
};
pub use session::{HostSession, SessionPhase};
pub use system::{ConfigError, Preferences, ShellConfig};
