//! Lifecycle states of the guest application and the host window.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Guest application state.
///
/// The state only moves forward. `Destroyed` is absorbing: once reached, no
/// further transition is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestApplicationState {
    /// No entry has been selected or instantiated yet.
    NotStarted,

    /// The entry is instantiated and its startup hook is running.
    Starting,

    /// The startup hook returned normally.
    Running,

    /// The guest is gone, either torn down or failed.
    Destroyed,
}

impl fmt::Display for GuestApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::Starting => write!(f, "Starting"),
            Self::Running => write!(f, "Running"),
            Self::Destroyed => write!(f, "Destroyed"),
        }
    }
}

impl GuestApplicationState {
    /// Whether guest code may currently be executing.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    /// Whether this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Valid next states from this state.
    pub fn valid_next_states(&self) -> &'static [GuestApplicationState] {
        match self {
            Self::NotStarted => &[Self::Starting, Self::Destroyed],
            Self::Starting => &[Self::Running, Self::Destroyed],
            Self::Running => &[Self::Destroyed],
            Self::Destroyed => &[],
        }
    }

    /// Check if a transition to `next` is valid.
    pub fn can_transition_to(&self, next: GuestApplicationState) -> bool {
        self.valid_next_states().contains(&next)
    }
}

/// Visibility of the host window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostVisibility {
    /// The window is shown and focused.
    Foreground,

    /// The window is hidden or lost focus.
    Background,
}

/// Why the host session is being ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The user confirmed exit and the destroy hook has completed.
    HostShutdown,

    /// The guest asked to be terminated.
    GuestRequested,

    /// The guest startup hook failed.
    StartupFailed,

    /// A session-start failure dialog was dismissed.
    SessionStartFailed,

    /// The entry selection prompt was dismissed.
    SelectionCancelled,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::HostShutdown => "host shutdown",
            Self::GuestRequested => "guest requested",
            Self::StartupFailed => "startup failed",
            Self::SessionStartFailed => "session start failed",
            Self::SelectionCancelled => "selection cancelled",
        };
        f.write_str(text)
    }
}
