//! Data model of a hosted session.
//!
//! These types describe what the host knows about a guest module (its
//! manifest and entry points), where a session is in its lifecycle, and what
//! the guest asks the host to show (displayables and their commands).

pub mod command;
pub mod displayable;
pub mod entry;
pub mod launch;
pub mod manifest;
pub mod state;

pub use command::{CommandEntry, CommandId, CommandKind, CommandListener, CommandSet};
pub use displayable::{Displayable, DisplayableContent, DisplayableKind};
pub use entry::EntryPointDescriptor;
pub use launch::{LaunchParams, Orientation};
pub use manifest::ModuleManifest;
pub use state::{GuestApplicationState, HostVisibility, TerminationReason};
