//! Host menu construction and command dispatch.

use std::fmt;
use std::sync::Arc;

use hostlet_core::{
    CommandId, Displayable, DisplayableId, DisplayableKind, InputOverlay, OverlayEditMode,
};
use tracing::{debug, warn};

use super::guest_events::{CommandAction, GuestEvents};

/// Session-level actions handled by the host itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostAction {
    /// Leave the guest, after confirmation
    ExitSession,
    /// Overlay: move keys
    EditKeys,
    /// Overlay: resize keys
    EditScales,
    /// Overlay: leave edit mode
    FinishEditing,
    /// Overlay: next layout
    SwitchLayout,
    /// Overlay: choose visible keys
    HideButtons,
}

impl HostAction {
    /// Actions shown only over full-screen surfaces with an overlay.
    pub const OVERLAY: [HostAction; 5] = [
        HostAction::EditKeys,
        HostAction::EditScales,
        HostAction::FinishEditing,
        HostAction::SwitchLayout,
        HostAction::HideButtons,
    ];

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ExitSession => "Exit",
            Self::EditKeys => "Edit keys",
            Self::EditScales => "Edit key sizes",
            Self::FinishEditing => "Finish editing",
            Self::SwitchLayout => "Switch layout",
            Self::HideButtons => "Hide buttons",
        }
    }

    /// Whether the action drives the input overlay.
    pub fn is_overlay(&self) -> bool {
        !matches!(self, Self::ExitSession)
    }
}

impl fmt::Display for HostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One host menu item. The variant decides who handles a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Handled by the host session
    Host {
        /// Action to run
        action: HostAction,
        /// Shown label
        label: String,
    },

    /// Forwarded to the guest's command listener
    Guest {
        /// Displayable the menu was built for
        displayable: DisplayableId,
        /// Command of that displayable
        id: CommandId,
        /// Shown label
        label: String,
    },
}

impl MenuEntry {
    /// Host entry with the action's default label.
    pub fn host(action: HostAction) -> Self {
        Self::Host {
            action,
            label: action.label().to_string(),
        }
    }

    /// Shown label.
    pub fn label(&self) -> &str {
        match self {
            Self::Host { label, .. } | Self::Guest { label, .. } => label,
        }
    }
}

/// Flattened host menu: host entries first, then guest commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostMenu {
    entries: Vec<MenuEntry>,
}

impl HostMenu {
    /// All entries in display order.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&MenuEntry> {
        self.entries.get(index)
    }

    /// Host entries.
    pub fn host_entries(&self) -> impl Iterator<Item = &MenuEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e, MenuEntry::Host { .. }))
    }

    /// Guest entries.
    pub fn guest_entries(&self) -> impl Iterator<Item = &MenuEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e, MenuEntry::Guest { .. }))
    }

    /// Whether the menu contains `action`.
    pub fn has_action(&self, action: HostAction) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, MenuEntry::Host { action: a, .. } if *a == action))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the menu is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive the host menu of `displayable`.
pub fn build_menu(displayable: &Displayable, overlay_present: bool) -> HostMenu {
    let mut entries = vec![MenuEntry::host(HostAction::ExitSession)];

    if overlay_present && displayable.kind() == DisplayableKind::FullScreenSurface {
        entries.extend(HostAction::OVERLAY.iter().copied().map(MenuEntry::host));
    }

    entries.extend(
        displayable
            .commands()
            .menu_order()
            .into_iter()
            .map(|command| MenuEntry::Guest {
                displayable: displayable.id(),
                id: command.id,
                label: command.label.clone(),
            }),
    );

    HostMenu { entries }
}

/// What the host session must do after a menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Show the exit confirmation prompt
    ConfirmExit,
    /// Show the key visibility dialog
    ShowKeyVisibility,
    /// The overlay handled the action
    OverlayUpdated,
    /// The command was queued for the guest listener
    GuestNotified,
    /// Nothing to do
    Ignored,
}

/// Route a menu selection made while `current` is shown.
///
/// Guest entries only match when their menu was built for `current`; a
/// selection from a stale menu is ignored. Matching commands are queued on
/// `guest_events` and this returns without waiting for the listener.
pub fn dispatch(
    entry: &MenuEntry,
    current: &Arc<Displayable>,
    overlay: Option<&mut (dyn InputOverlay + '_)>,
    guest_events: &mut GuestEvents,
) -> Dispatch {
    match entry {
        MenuEntry::Host {
            action: HostAction::ExitSession,
            ..
        } => Dispatch::ConfirmExit,
        MenuEntry::Host { action, .. } => {
            let Some(overlay) = overlay else {
                debug!(%action, "no input overlay");
                return Dispatch::Ignored;
            };
            if current.kind() != DisplayableKind::FullScreenSurface {
                debug!(%action, "overlay action outside a full-screen surface");
                return Dispatch::Ignored;
            }
            match action {
                HostAction::EditKeys => overlay.switch_edit_mode(OverlayEditMode::Keys),
                HostAction::EditScales => overlay.switch_edit_mode(OverlayEditMode::Scales),
                HostAction::FinishEditing => overlay.switch_edit_mode(OverlayEditMode::Finish),
                HostAction::SwitchLayout => overlay.switch_layout(),
                HostAction::HideButtons => return Dispatch::ShowKeyVisibility,
                HostAction::ExitSession => return Dispatch::ConfirmExit,
            }
            Dispatch::OverlayUpdated
        }
        MenuEntry::Guest {
            displayable,
            id,
            label,
        } => {
            if *displayable != current.id() {
                debug!(command = %id, %label, "selection from a stale menu");
                return Dispatch::Ignored;
            }
            let Some(listener) = current.listener() else {
                debug!(command = %id, "displayable has no command listener");
                return Dispatch::Ignored;
            };
            let Some(command) = current.commands().get(*id) else {
                debug!(command = %id, %label, "command not in current displayable");
                return Dispatch::Ignored;
            };

            let action =
                CommandAction::new(Arc::clone(listener), command.clone(), Arc::clone(current));
            match guest_events.post(action) {
                Ok(()) => Dispatch::GuestNotified,
                Err(e) => {
                    warn!(command = %id, error = %e, "command action dropped");
                    Dispatch::Ignored
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostlet_core::{CommandEntry, CommandKind, CommandListener, CommandSet, SessionId};
    use parking_lot::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Recorder {
        actions: Mutex<Vec<String>>,
    }

    impl CommandListener for Recorder {
        fn command_action(&self, command: &CommandEntry, displayable: &Displayable) {
            self.actions
                .lock()
                .push(format!("{}@{}", command.label, displayable.title()));
        }
    }

    #[derive(Default)]
    struct FakeOverlay {
        calls: Vec<String>,
    }

    impl InputOverlay for FakeOverlay {
        fn switch_edit_mode(&mut self, mode: OverlayEditMode) {
            self.calls.push(format!("{:?}", mode));
        }

        fn switch_layout(&mut self) {
            self.calls.push("layout".into());
        }

        fn key_names(&self) -> Vec<String> {
            vec!["Fire".into()]
        }

        fn key_visibility(&self) -> Vec<bool> {
            vec![true]
        }

        fn set_key_visibility(&mut self, _index: usize, _visible: bool) {}
    }

    fn commands() -> CommandSet {
        CommandSet::builder()
            .command("Back", CommandKind::Back, 2)
            .command("Play", CommandKind::Screen, 1)
            .build()
    }

    #[test]
    fn test_menu_for_form() {
        let form = Displayable::form("Menu", ["Play"]).with_commands(commands());
        let menu = build_menu(&form, true);

        let labels: Vec<&str> = menu.entries().iter().map(MenuEntry::label).collect();
        assert_eq!(labels, vec!["Exit", "Play", "Back"]);
        assert_eq!(menu.host_entries().count(), 1);
        assert!(!menu.has_action(HostAction::EditKeys));
    }

    #[test]
    fn test_menu_for_surface_with_overlay() {
        let surface = Displayable::surface("Canvas").with_commands(commands());

        let menu = build_menu(&surface, true);
        assert_eq!(menu.host_entries().count(), 6);
        assert_eq!(menu.guest_entries().count(), 2);
        assert!(menu.has_action(HostAction::HideButtons));
        assert_eq!(menu.get(0), Some(&MenuEntry::host(HostAction::ExitSession)));

        let menu = build_menu(&surface, false);
        assert_eq!(menu.host_entries().count(), 1);
    }

    fn events() -> GuestEvents {
        GuestEvents::new(SessionId::new())
    }

    /// Close the queue and wait until every queued action was delivered.
    fn settle(events: &mut GuestEvents) {
        if let Some(worker) = events.close() {
            assert!(worker.join());
        }
    }

    #[test]
    fn test_dispatch_guest_command() {
        let recorder = Arc::new(Recorder::default());
        let form = Arc::new(
            Displayable::form("Menu", ["Play"])
                .with_commands(commands())
                .with_listener(recorder.clone()),
        );
        let menu = build_menu(&form, false);
        let mut events = events();

        let play = menu.guest_entries().next().unwrap().clone();
        assert_eq!(dispatch(&play, &form, None, &mut events), Dispatch::GuestNotified);
        settle(&mut events);
        assert_eq!(*recorder.actions.lock(), vec!["Play@Menu"]);
    }

    #[test]
    fn test_stale_menu_never_reaches_another_displayable() {
        let recorder = Arc::new(Recorder::default());
        let form = Displayable::form("Menu", ["Play"])
            .with_commands(CommandSet::builder().command("Play", CommandKind::Screen, 1).build())
            .with_listener(recorder.clone());
        let stale_menu = build_menu(&form, false);

        let game = Arc::new(
            Displayable::surface("Game")
                .with_commands(
                    CommandSet::builder()
                        .command("Delete save", CommandKind::Screen, 1)
                        .build(),
                )
                .with_listener(recorder.clone()),
        );
        let play = stale_menu.guest_entries().next().unwrap();
        let delete = game.commands().iter().next().unwrap();
        assert!(matches!(play, MenuEntry::Guest { id, .. } if *id == delete.id));

        let mut events = events();
        assert_eq!(dispatch(play, &game, None, &mut events), Dispatch::Ignored);
        settle(&mut events);
        assert!(recorder.actions.lock().is_empty());
    }

    #[test]
    fn test_dispatch_does_not_wait_for_listener() {
        struct Sleepy;

        impl CommandListener for Sleepy {
            fn command_action(&self, _command: &CommandEntry, _displayable: &Displayable) {
                thread::sleep(Duration::from_millis(500));
            }
        }

        let form = Arc::new(
            Displayable::form("Menu", ["Play"])
                .with_commands(commands())
                .with_listener(Arc::new(Sleepy)),
        );
        let menu = build_menu(&form, false);
        let entry = menu.guest_entries().next().unwrap();
        let mut events = events();

        let started = Instant::now();
        assert_eq!(dispatch(entry, &form, None, &mut events), Dispatch::GuestNotified);
        assert!(started.elapsed() < Duration::from_millis(200));
        settle(&mut events);
    }

    #[test]
    fn test_dispatch_without_listener() {
        let form = Arc::new(Displayable::form("Menu", ["Play"]).with_commands(commands()));
        let menu = build_menu(&form, false);
        let entry = menu.guest_entries().next().unwrap();
        let mut events = events();
        assert_eq!(dispatch(entry, &form, None, &mut events), Dispatch::Ignored);
        assert!(!events.is_running());
    }

    #[test]
    fn test_dispatch_host_actions() {
        let surface = Arc::new(Displayable::surface("Canvas"));
        let mut overlay = FakeOverlay::default();
        let mut events = events();

        let exit = MenuEntry::host(HostAction::ExitSession);
        assert_eq!(dispatch(&exit, &surface, None, &mut events), Dispatch::ConfirmExit);

        for action in [HostAction::EditKeys, HostAction::SwitchLayout] {
            let entry = MenuEntry::host(action);
            assert_eq!(
                dispatch(&entry, &surface, Some(&mut overlay), &mut events),
                Dispatch::OverlayUpdated
            );
        }
        assert_eq!(overlay.calls, vec!["Keys", "layout"]);

        let hide = MenuEntry::host(HostAction::HideButtons);
        assert_eq!(
            dispatch(&hide, &surface, Some(&mut overlay), &mut events),
            Dispatch::ShowKeyVisibility
        );

        let form = Arc::new(Displayable::form("Menu", ["Play"]));
        let edit = MenuEntry::host(HostAction::EditScales);
        assert_eq!(
            dispatch(&edit, &form, Some(&mut overlay), &mut events),
            Dispatch::Ignored
        );
        assert_eq!(dispatch(&edit, &surface, None, &mut events), Dispatch::Ignored);
        assert!(!events.is_running());
    }
}
