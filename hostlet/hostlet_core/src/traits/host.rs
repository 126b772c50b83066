//! Host-side collaborators.
//!
//! The platform UI shell implements [`HostWindow`] and [`HostDialogs`]; the
//! optional on-screen input overlay implements [`InputOverlay`]. All of them
//! are driven exclusively from the UI-owning thread, so none of the methods
//! require `Send` or `Sync`.
//!
//! Dialogs are asynchronous: `show_*` only presents the dialog. The answer
//! comes back later as a call on the host session (`on_entry_chosen`,
//! `on_exit_confirmed`, `on_error_dismissed`, ...).

use crate::types::{Displayable, Orientation, TerminationReason};

/// Presentation of the host's title bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeState {
    /// Whether the bar is shown
    pub visible: bool,

    /// Title text when shown
    pub title: Option<String>,

    /// Height in pixels
    pub height: u32,
}

impl ChromeState {
    /// Hidden chrome.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            title: None,
            height: 0,
        }
    }

    /// Visible chrome with a title.
    pub fn shown(title: impl Into<String>, height: u32) -> Self {
        Self {
            visible: true,
            title: Some(title.into()),
            height,
        }
    }
}

/// The host window.
pub trait HostWindow {
    /// Replace the hosted view with the displayable's view.
    fn replace_content(&mut self, displayable: &Displayable);

    /// Enter or leave immersive full-screen presentation.
    fn set_immersive(&mut self, immersive: bool);

    /// Apply title bar visibility, title and height.
    fn set_chrome(&mut self, chrome: &ChromeState);

    /// The menu must be rebuilt before it is next shown.
    fn invalidate_menu(&mut self);

    /// Show the menu.
    fn open_menu(&mut self);

    /// Lock or release the screen orientation.
    fn set_orientation(&mut self, orientation: Orientation);

    /// Keep the screen on while the window is shown.
    fn set_keep_screen_on(&mut self, keep_on: bool);

    /// Close the window and end the host session.
    fn finish(&mut self, reason: TerminationReason);
}

/// Modal dialogs of the host.
pub trait HostDialogs {
    /// Let the user pick one of several entry points.
    fn show_entry_chooser(&mut self, names: &[String]);

    /// Blocking error dialog; dismissal ends the session.
    fn show_error(&mut self, message: &str);

    /// Ask the user to confirm leaving the guest.
    fn show_exit_confirmation(&mut self);

    /// Multi-choice list of overlay keys with their visibility.
    fn show_key_visibility(&mut self, names: &[String], visible: &[bool]);
}

/// A complete host shell.
pub trait HostShell: HostWindow + HostDialogs {}

impl<T: HostWindow + HostDialogs> HostShell for T {}

/// Layout editing modes of the input overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEditMode {
    /// Move keys
    Keys,
    /// Resize keys
    Scales,
    /// Leave edit mode and persist the layout
    Finish,
}

/// On-screen virtual input overlay drawn over full-screen surfaces.
pub trait InputOverlay {
    /// Enter or leave a layout edit mode.
    fn switch_edit_mode(&mut self, mode: OverlayEditMode);

    /// Cycle to the next key layout.
    fn switch_layout(&mut self);

    /// Names of all keys, in overlay order.
    fn key_names(&self) -> Vec<String>;

    /// Visibility of all keys, parallel to [`InputOverlay::key_names`].
    fn key_visibility(&self) -> Vec<bool>;

    /// Show or hide one key.
    fn set_key_visibility(&mut self, index: usize, visible: bool);
}
