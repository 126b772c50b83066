//! Host session.
//!
//! A [`HostSession`] is created when the host window opens and lives until
//! the window finishes. It is driven exclusively from the UI-owning thread:
//! the platform shell forwards its window callbacks (`on_*` methods) and
//! calls [`HostSession::pump`] whenever the marshaling channel may hold
//! events. Guest threads only ever reach the session through the channel.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hostlet_concurrency::{marshal_channel, UiReceiver};
use hostlet_core::{
    DisplayCapability, Displayable, EntryPointDescriptor, GuestApplicationState, HostShell,
    HostVisibility, InputOverlay, LaunchParams, LifecycleCapability, SessionError, SessionId,
    TerminationReason,
};
use hostlet_isolation::{GuestRegistry, LoadedModule, ModuleLoader};
use tracing::{debug, error, info, warn};

use crate::bridge::{
    dispatch, Dispatch, DisplayHandle, EntrySelector, GuestEvents, HostMenu, LifecycleBridge,
    MenuEntry, PresentationAdapter, Selection, UiEvent,
};
use crate::system::ShellConfig;

/// Where the session stands from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Reading and staging the module
    Loading,
    /// Waiting for the user to pick an entry point
    AwaitingEntry,
    /// An entry was handed to the lifecycle bridge
    Started,
    /// Session start failed; the error dialog is shown
    Failed,
    /// The window was finished
    Finished,
}

/// One hosted guest session.
pub struct HostSession<H: HostShell> {
    session_id: SessionId,
    host: H,
    overlay: Option<Box<dyn InputOverlay>>,
    module: Option<LoadedModule>,
    selector: Option<EntrySelector>,
    bridge: Arc<LifecycleBridge>,
    display: Arc<DisplayHandle>,
    presentation: PresentationAdapter,
    guest_events: GuestEvents,
    events: UiReceiver<UiEvent>,
    phase: SessionPhase,
    termination: Option<TerminationReason>,
}

impl<H: HostShell> HostSession<H> {
    /// Open a session for the module described by `launch`.
    ///
    /// Never fails: a session-start failure is shown in the host's error
    /// dialog and the session ends once it is dismissed.
    pub fn create(
        launch: LaunchParams,
        config: &ShellConfig,
        registry: Arc<GuestRegistry>,
        host: H,
        overlay: Option<Box<dyn InputOverlay>>,
    ) -> Self {
        let loader = ModuleLoader::new(&config.data_dir, config.layout.clone(), registry);
        Self::create_with_loader(launch, config, loader, host, overlay)
    }

    /// Like [`HostSession::create`], loading the module with `loader`, e.g.
    /// one reading module-packaged classes.
    pub fn create_with_loader(
        launch: LaunchParams,
        config: &ShellConfig,
        loader: ModuleLoader,
        mut host: H,
        overlay: Option<Box<dyn InputOverlay>>,
    ) -> Self {
        let session_id = SessionId::new();
        info!(
            session = %session_id,
            module = %launch.module_root.display(),
            "creating host session"
        );

        clean_cache_dir(Path::new(&config.cache_dir));
        if config.preferences.keep_screen_on {
            host.set_keep_screen_on(true);
        }
        host.set_orientation(launch.orientation);

        let (sender, events) = marshal_channel("ui");
        let bridge = LifecycleBridge::new(session_id, sender.clone());
        let display = Arc::new(DisplayHandle::new(sender));
        let presentation =
            PresentationAdapter::new("", config.preferences.clone(), overlay.is_some());

        let mut session = Self {
            session_id,
            host,
            overlay,
            module: None,
            selector: None,
            bridge,
            display,
            presentation,
            guest_events: GuestEvents::new(session_id),
            events,
            phase: SessionPhase::Loading,
            termination: None,
        };

        match loader.load(&launch.module_root, session_id) {
            Ok(module) => {
                session.presentation.set_module_name(module.module_name.clone());
                let manifest = launch.module_root.join(&loader.layout().manifest_file);
                session.selector = Some(EntrySelector::new(manifest, module.entries.clone()));
                session.module = Some(module);
                session.select_entry();
            }
            Err(e) => session.fail(e),
        }
        session
    }

    fn select_entry(&mut self) {
        let Some(selector) = self.selector.as_mut() else {
            return;
        };
        match selector.select() {
            Ok(Selection::Immediate(entry)) => self.start_entry(entry),
            Ok(Selection::Prompt(names)) => {
                debug!(session = %self.session_id, count = names.len(), "asking for entry point");
                self.phase = SessionPhase::AwaitingEntry;
                self.host.show_entry_chooser(&names);
            }
            Err(e) => self.fail(e),
        }
    }

    fn start_entry(&mut self, entry: EntryPointDescriptor) {
        let Some(module) = self.module.as_ref() else {
            return;
        };
        info!(session = %self.session_id, entry = %entry, "starting entry point");

        let display: Arc<dyn DisplayCapability> = self.display.clone();
        let lifecycle: Arc<dyn LifecycleCapability> = self.bridge.clone();
        let manifest = Arc::clone(&module.manifest);
        let context = &module.context;
        let class = entry.class_name.as_str();

        let started = self.bridge.start(class, || {
            context.instantiate(class, manifest, display, lifecycle)
        });
        match started {
            Ok(()) => self.phase = SessionPhase::Started,
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, err: SessionError) {
        match err {
            SessionError::Cancelled => self.finish(TerminationReason::SelectionCancelled),
            err => {
                error!(session = %self.session_id, error = %err, "session start failed");
                self.phase = SessionPhase::Failed;
                self.host.show_error(&err.to_string());
            }
        }
    }

    fn finish(&mut self, reason: TerminationReason) {
        if self.termination.is_some() {
            return;
        }
        info!(session = %self.session_id, %reason, "finishing host session");
        self.termination = Some(reason);
        self.phase = SessionPhase::Finished;
        // queued command actions still run; the worker is never joined here
        drop(self.guest_events.close());
        if let Some(module) = &self.module {
            module.context.discard();
        }
        self.host.finish(reason);
    }

    /// The user picked entry `index` in the chooser. An index outside the
    /// list is ignored and the chooser stays open.
    pub fn on_entry_chosen(&mut self, index: usize) {
        let Some(selector) = self.selector.as_mut() else {
            return;
        };
        match selector.resolve(Some(index)) {
            Ok(Some(entry)) => self.start_entry(entry),
            Ok(None) => {}
            Err(e) => self.fail(e),
        }
    }

    /// The chooser was dismissed without a choice.
    pub fn on_entry_selection_dismissed(&mut self) {
        let Some(selector) = self.selector.as_mut() else {
            return;
        };
        if let Err(e) = selector.resolve(None) {
            self.fail(e);
        }
    }

    /// The error dialog was dismissed.
    pub fn on_error_dismissed(&mut self) {
        if self.phase == SessionPhase::Failed {
            self.finish(TerminationReason::SessionStartFailed);
        }
    }

    /// The window came to the foreground.
    pub fn on_foreground(&mut self) {
        self.display.set_host_visible(true);
        self.bridge.on_visibility(HostVisibility::Foreground);
    }

    /// The window went to the background.
    pub fn on_background(&mut self) {
        self.display.set_host_visible(false);
        self.bridge.on_visibility(HostVisibility::Background);
    }

    /// The window is no longer visible at all.
    pub fn on_stop(&mut self) {
        self.bridge.on_stop();
    }

    /// The window gained or lost input focus.
    pub fn on_window_focus_changed(&mut self, has_focus: bool) {
        if has_focus {
            self.presentation.on_focus_regained(&mut self.host);
        }
    }

    /// The back key opens the menu; it never leaves the guest directly.
    pub fn on_back_key(&mut self) {
        self.host.open_menu();
    }

    /// Menu to show, derived from the current displayable.
    pub fn on_prepare_menu(&self) -> Option<HostMenu> {
        self.presentation.menu().cloned()
    }

    /// The user selected `entry` in the menu. Guest commands are queued for
    /// the guest and this returns without waiting for them.
    pub fn on_menu_selected(&mut self, entry: &MenuEntry) {
        let Some(current) = self.presentation.current().cloned() else {
            return;
        };
        if matches!(entry, MenuEntry::Guest { .. }) && !self.bridge.state().is_active() {
            debug!(session = %self.session_id, "guest command outside the guest's lifetime");
            return;
        }
        let overlay = self.overlay.as_deref_mut();
        match dispatch(entry, &current, overlay, &mut self.guest_events) {
            Dispatch::ConfirmExit => self.host.show_exit_confirmation(),
            Dispatch::ShowKeyVisibility => {
                if let Some(overlay) = &self.overlay {
                    let names = overlay.key_names();
                    let visible = overlay.key_visibility();
                    self.host.show_key_visibility(&names, &visible);
                }
            }
            Dispatch::OverlayUpdated | Dispatch::GuestNotified | Dispatch::Ignored => {}
        }
    }

    /// The user confirmed leaving the guest.
    pub fn on_exit_confirmed(&mut self) {
        self.bridge.request_destroy(TerminationReason::HostShutdown);
    }

    /// The user declined leaving the guest.
    pub fn on_exit_declined(&mut self) {
        debug!(session = %self.session_id, "exit declined");
    }

    /// A key was toggled in the key visibility dialog.
    pub fn on_key_visibility_changed(&mut self, index: usize, visible: bool) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_key_visibility(index, visible);
        }
    }

    /// Apply every queued event in FIFO order. Returns how many were
    /// handled.
    pub fn pump(&mut self) -> usize {
        let mut batch = Vec::new();
        self.events.drain(|event| batch.push(event));
        let handled = batch.len();
        for event in batch {
            self.handle_event(event);
        }
        handled
    }

    /// Pump events until the session finishes or `timeout` elapses.
    /// Returns the termination reason, if any.
    pub fn run(&mut self, timeout: Option<Duration>) -> Option<TerminationReason> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let tick = Duration::from_millis(50);

        while self.termination.is_none() {
            let wait = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        warn!(session = %self.session_id, "session run timed out");
                        break;
                    }
                    tick.min(deadline - now)
                }
                None => tick,
            };

            match self.events.recv_timeout(wait) {
                Ok(Some(event)) => {
                    self.handle_event(event);
                    self.pump();
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(session = %self.session_id, error = %e, "ui channel closed");
                    break;
                }
            }
        }
        self.termination
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::SetCurrent(displayable) => {
                if self.termination.is_some() {
                    debug!(session = %self.session_id, "set current after finish ignored");
                    return;
                }
                self.presentation.apply(displayable, &mut self.host);
            }
            UiEvent::Terminate(reason) => self.finish(reason),
        }
    }

    /// Session identifier.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Host phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Guest state.
    pub fn guest_state(&self) -> GuestApplicationState {
        self.bridge.state()
    }

    /// Why the session finished, once it has.
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Whether the session finished.
    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    /// Displayable shown in the window.
    pub fn current_displayable(&self) -> Option<&Arc<Displayable>> {
        self.presentation.current()
    }

    /// Loaded module, if loading succeeded.
    pub fn module(&self) -> Option<&LoadedModule> {
        self.module.as_ref()
    }

    /// Lifecycle bridge of the session.
    pub fn bridge(&self) -> &Arc<LifecycleBridge> {
        &self.bridge
    }

    /// Host shell.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Host shell, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: HostShell> std::fmt::Debug for HostSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostSession")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase)
            .field("guest_state", &self.bridge.state())
            .field("termination", &self.termination)
            .finish()
    }
}

/// Delete the files directly under `dir`; subdirectories are kept.
fn clean_cache_dir(dir: &Path) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "no cache directory to clean");
            return;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(file = %path.display(), error = %e, "failed to delete cache file"),
        }
    }
    debug!(dir = %dir.display(), removed, "cache directory cleaned");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_cache_dir_keeps_subdirectories() {
        let cache = TempDir::new().unwrap();
        fs::write(cache.path().join("a.tmp"), b"a").unwrap();
        fs::write(cache.path().join("b.tmp"), b"b").unwrap();
        fs::create_dir(cache.path().join("keep")).unwrap();
        fs::write(cache.path().join("keep/inner"), b"c").unwrap();

        clean_cache_dir(cache.path());

        assert!(!cache.path().join("a.tmp").exists());
        assert!(!cache.path().join("b.tmp").exists());
        assert!(cache.path().join("keep/inner").exists());
    }

    #[test]
    fn test_clean_missing_cache_dir() {
        let cache = TempDir::new().unwrap();
        clean_cache_dir(&cache.path().join("missing"));
    }
}
