//! Bridge between the guest and the host window.
//!
//! - [`selector`] picks the entry point to start.
//! - [`lifecycle`] owns the guest state machine and its worker threads.
//! - [`presentation`] applies the guest's displayables to the window.
//! - [`dispatcher`] builds the host menu and routes menu selections.
//! - [`guest_events`] runs the guest's command listeners off the UI thread.
//!
//! Guest threads never touch the window. They post [`UiEvent`]s onto the
//! marshaling channel, which the host session drains on the UI-owning
//! thread.

pub mod dispatcher;
pub mod guest_events;
pub mod lifecycle;
pub mod presentation;
pub mod selector;

use std::sync::Arc;

use hostlet_core::{Displayable, TerminationReason};

pub use dispatcher::{build_menu, dispatch, Dispatch, HostAction, HostMenu, MenuEntry};
pub use guest_events::{CommandAction, GuestEvents, GUEST_EVENTS_THREAD};
pub use lifecycle::{LifecycleBridge, DESTROY_THREAD, STARTUP_THREAD};
pub use presentation::{DisplayHandle, PresentationAdapter};
pub use selector::{EntrySelector, Selection};

/// Event marshaled onto the UI-owning thread.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Make the displayable current
    SetCurrent(Arc<Displayable>),

    /// End the host session
    Terminate(TerminationReason),
}
