//! Presentation of guest displayables.
//!
//! [`DisplayHandle`] is the guest-facing half: callable from any thread, it
//! records the requested displayable and posts it onto the marshaling
//! channel. [`PresentationAdapter`] is the UI-thread half: it applies each
//! drained request to the host window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hostlet_concurrency::UiSender;
use hostlet_core::{ChromeState, DisplayCapability, Displayable, DisplayableKind, HostWindow};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::dispatcher::{build_menu, HostMenu};
use super::UiEvent;
use crate::system::Preferences;

/// Guest-facing display capability.
pub struct DisplayHandle {
    requested: Mutex<Option<Arc<Displayable>>>,
    visible: AtomicBool,
    events: UiSender<UiEvent>,
}

impl DisplayHandle {
    /// Handle posting to `events`.
    pub fn new(events: UiSender<UiEvent>) -> Self {
        Self {
            requested: Mutex::new(None),
            visible: AtomicBool::new(false),
            events,
        }
    }

    /// Record host window visibility.
    pub fn set_host_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }
}

impl DisplayCapability for DisplayHandle {
    fn set_current(&self, displayable: Arc<Displayable>) {
        // Posting under the lock keeps the recorded request and the queue
        // order identical across threads.
        let mut requested = self.requested.lock();
        *requested = Some(Arc::clone(&displayable));
        debug!(title = %displayable.title(), kind = ?displayable.kind(), "set current requested");
        if let Err(e) = self.events.post(UiEvent::SetCurrent(displayable)) {
            warn!(error = %e, "set current dropped");
        }
    }

    fn current(&self) -> Option<Arc<Displayable>> {
        self.requested.lock().clone()
    }

    fn is_host_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayHandle")
            .field("visible", &self.is_host_visible())
            .finish()
    }
}

/// Applies displayables to the host window. UI-owning thread only.
#[derive(Debug)]
pub struct PresentationAdapter {
    module_name: String,
    preferences: Preferences,
    overlay_present: bool,
    current: Option<Arc<Displayable>>,
    menu: Option<HostMenu>,
}

impl PresentationAdapter {
    /// Adapter titling full-screen chrome with `module_name`.
    pub fn new(
        module_name: impl Into<String>,
        preferences: Preferences,
        overlay_present: bool,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            preferences,
            overlay_present,
            current: None,
            menu: None,
        }
    }

    /// Replace the module name used as full-screen title.
    pub fn set_module_name(&mut self, module_name: impl Into<String>) {
        self.module_name = module_name.into();
    }

    /// The displayable shown in the window.
    pub fn current(&self) -> Option<&Arc<Displayable>> {
        self.current.as_ref()
    }

    /// Menu derived from the current displayable.
    pub fn menu(&self) -> Option<&HostMenu> {
        self.menu.as_ref()
    }

    /// Chrome for a displayable.
    pub fn chrome_for(&self, displayable: &Displayable) -> ChromeState {
        match displayable.kind() {
            DisplayableKind::FullScreenSurface => {
                if self.preferences.always_show_chrome {
                    ChromeState::shown(
                        self.module_name.clone(),
                        self.preferences.reduced_chrome_height(),
                    )
                } else {
                    ChromeState::hidden()
                }
            }
            DisplayableKind::WindowedForm | DisplayableKind::Other => ChromeState::shown(
                displayable.title(),
                self.preferences.base_chrome_height,
            ),
        }
    }

    /// Make `displayable` current: swap the view, apply immersive mode and
    /// chrome, then rebuild the menu.
    pub fn apply(&mut self, displayable: Arc<Displayable>, window: &mut dyn HostWindow) {
        let immersive = displayable.kind() == DisplayableKind::FullScreenSurface;
        let chrome = self.chrome_for(&displayable);

        window.replace_content(&displayable);
        window.set_immersive(immersive);
        window.set_chrome(&chrome);

        self.menu = Some(build_menu(&displayable, self.overlay_present));
        window.invalidate_menu();

        debug!(
            title = %displayable.title(),
            kind = ?displayable.kind(),
            immersive,
            chrome = chrome.visible,
            "displayable applied"
        );
        self.current = Some(displayable);
    }

    /// Re-enter immersive mode after the window regains focus.
    pub fn on_focus_regained(&self, window: &mut dyn HostWindow) {
        if let Some(current) = &self.current {
            if current.kind() == DisplayableKind::FullScreenSurface {
                window.set_immersive(true);
            }
        }
    }
}
