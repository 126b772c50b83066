//! Headless host window.
//!
//! Prints every window action as one line on stdout and keeps the dialogs
//! it was asked to show, so the run loop can answer them.

use hostlet_core::{
    ChromeState, Displayable, DisplayableContent, HostDialogs, HostWindow, Orientation,
    TerminationReason,
};

/// Dialog waiting for an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDialog {
    /// Entry chooser with the offered names
    EntryChooser(Vec<String>),
    /// Session start failure
    Error(String),
    /// Exit confirmation
    ConfirmExit,
}

/// Host window without a screen.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    dialogs: Vec<PendingDialog>,
    finished: Option<TerminationReason>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the dialogs shown since the last call.
    pub fn take_dialogs(&mut self) -> Vec<PendingDialog> {
        std::mem::take(&mut self.dialogs)
    }

    /// Reason passed to [`HostWindow::finish`], once the window closed.
    pub fn finished(&self) -> Option<TerminationReason> {
        self.finished
    }
}

impl HostWindow for HeadlessHost {
    fn replace_content(&mut self, displayable: &Displayable) {
        match displayable.content() {
            DisplayableContent::WindowedForm { items } => {
                println!("display: form \"{}\"", displayable.title());
                for item in items {
                    println!("  | {}", item);
                }
            }
            DisplayableContent::FullScreenSurface { .. } => {
                println!("display: surface \"{}\"", displayable.title());
            }
            DisplayableContent::Other { widget } => {
                println!("display: {} \"{}\"", widget, displayable.title());
            }
        }
    }

    fn set_immersive(&mut self, immersive: bool) {
        println!("immersive: {}", if immersive { "on" } else { "off" });
    }

    fn set_chrome(&mut self, chrome: &ChromeState) {
        match (&chrome.title, chrome.visible) {
            (Some(title), true) => println!("chrome: \"{}\" ({}px)", title, chrome.height),
            _ => println!("chrome: hidden"),
        }
    }

    fn invalidate_menu(&mut self) {}

    fn open_menu(&mut self) {
        println!("menu: opened");
    }

    fn set_orientation(&mut self, orientation: Orientation) {
        println!("orientation: {}", orientation);
    }

    fn set_keep_screen_on(&mut self, keep_on: bool) {
        println!("keep screen on: {}", keep_on);
    }

    fn finish(&mut self, reason: TerminationReason) {
        println!("finished: {}", reason);
        self.finished = Some(reason);
    }
}

impl HostDialogs for HeadlessHost {
    fn show_entry_chooser(&mut self, names: &[String]) {
        println!("choose an entry:");
        for (i, name) in names.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
        self.dialogs.push(PendingDialog::EntryChooser(names.to_vec()));
    }

    fn show_error(&mut self, message: &str) {
        println!("error dialog: {}", message);
        self.dialogs.push(PendingDialog::Error(message.to_string()));
    }

    fn show_exit_confirmation(&mut self) {
        println!("confirm exit?");
        self.dialogs.push(PendingDialog::ConfirmExit);
    }

    fn show_key_visibility(&mut self, names: &[String], visible: &[bool]) {
        println!("keys:");
        for (name, shown) in names.iter().zip(visible) {
            println!("  [{}] {}", if *shown { "x" } else { " " }, name);
        }
    }
}
