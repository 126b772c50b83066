//! Host session tests driven through a recording host shell.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hostlet_core::{
    ChromeState, CommandEntry, CommandKind, CommandListener, CommandSet, Displayable,
    GuestApplication, GuestApplicationState, GuestContext, GuestError, HostDialogs, HostShell,
    HostWindow, InputOverlay, LaunchParams, Orientation, OverlayEditMode, TerminationReason,
};
use hostlet_isolation::GuestRegistry;
use hostlet_runtime::{HostAction, HostSession, MenuEntry, SessionPhase, ShellConfig};
use parking_lot::Mutex;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Ordered record of everything the guests did.
#[derive(Default)]
struct Journal(Mutex<Vec<String>>);

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.0.lock().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

#[derive(Clone, Copy)]
enum Script {
    /// Shows a menu form with Play and Quit commands
    Menu,
    /// Requests three displayables in a row
    Burst,
    /// Shows a surface and immediately replaces it with a form
    SurfaceThenForm,
    /// Shows a surface only
    Surface,
    /// Fails its startup hook
    FailStart,
    /// Fails its destroy hook
    FailDestroy,
    /// Shows a form whose only command takes a long time
    Sluggish,
}

struct ScriptedGuest {
    name: &'static str,
    script: Script,
    context: GuestContext,
    journal: Arc<Journal>,
}

struct MenuListener {
    context: GuestContext,
    journal: Arc<Journal>,
}

impl MenuListener {
    fn playfield(&self) -> Arc<Displayable> {
        let commands = CommandSet::builder()
            .command("Delete save", CommandKind::Item, 1)
            .command("Reset", CommandKind::Item, 2)
            .build();
        Arc::new(
            Displayable::surface("Playfield")
                .with_commands(commands)
                .with_listener(Arc::new(MenuListener {
                    context: self.context.clone(),
                    journal: Arc::clone(&self.journal),
                })),
        )
    }
}

impl CommandListener for MenuListener {
    fn command_action(&self, command: &CommandEntry, displayable: &Displayable) {
        let thread = thread::current().name().unwrap_or_default().to_string();
        if command.label == "Think" {
            thread::sleep(Duration::from_millis(1500));
        }
        self.journal.push(format!(
            "command:{}@{} on {}",
            command.label,
            displayable.title(),
            thread
        ));
        match command.kind {
            CommandKind::Exit => self.context.request_termination(),
            CommandKind::Screen => self.context.display().set_current(self.playfield()),
            _ => {}
        }
    }
}

impl ScriptedGuest {
    fn listener(&self) -> Arc<MenuListener> {
        Arc::new(MenuListener {
            context: self.context.clone(),
            journal: Arc::clone(&self.journal),
        })
    }

    fn menu(&self) -> Arc<Displayable> {
        let commands = CommandSet::builder()
            .command("Play", CommandKind::Screen, 1)
            .command("Quit", CommandKind::Exit, 2)
            .build();
        Arc::new(
            Displayable::form("Menu", ["Play", "Quit"])
                .with_commands(commands)
                .with_listener(self.listener()),
        )
    }

    fn busy(&self) -> Arc<Displayable> {
        let commands = CommandSet::builder()
            .command("Think", CommandKind::Item, 1)
            .build();
        Arc::new(
            Displayable::form("Busy", ["..."])
                .with_commands(commands)
                .with_listener(self.listener()),
        )
    }
}

impl GuestApplication for ScriptedGuest {
    fn start(&self) -> Result<(), GuestError> {
        self.journal.push(format!("start:{}", self.name));
        let display = self.context.display();
        match self.script {
            Script::Menu | Script::FailDestroy => display.set_current(self.menu()),
            Script::Burst => {
                display.set_current(Arc::new(Displayable::form("A", ["a"])));
                display.set_current(Arc::new(Displayable::surface("B")));
                display.set_current(self.menu());
            }
            Script::SurfaceThenForm => {
                display.set_current(Arc::new(Displayable::surface("Canvas")));
                display.set_current(Arc::new(Displayable::form("Scores", ["1. AAA"])));
            }
            Script::Surface => display.set_current(Arc::new(Displayable::surface("Canvas"))),
            Script::Sluggish => display.set_current(self.busy()),
            Script::FailStart => return Err(GuestError::failed("no resources")),
        }
        Ok(())
    }

    fn pause(&self) {
        self.journal.push("pause");
    }

    fn resume(&self) {
        self.journal.push("resume");
    }

    fn stopped(&self) {
        self.journal.push("stopped");
    }

    fn destroy(&self) -> Result<(), GuestError> {
        let thread = thread::current().name().unwrap_or_default().to_string();
        self.journal.push(format!("destroy:{}", thread));
        match self.script {
            Script::FailDestroy => Err(GuestError::failed("save failed")),
            _ => Ok(()),
        }
    }
}

fn registry(journal: &Arc<Journal>) -> Arc<GuestRegistry> {
    let registry = Arc::new(GuestRegistry::new());
    let classes = [
        ("com.example.One", "One", Script::Menu),
        ("com.example.Two", "Two", Script::Menu),
        ("com.example.Burst", "Burst", Script::Burst),
        ("com.example.Swap", "Swap", Script::SurfaceThenForm),
        ("com.example.Canvas", "Canvas", Script::Surface),
        ("com.example.Broken", "Broken", Script::FailStart),
        ("com.example.Stubborn", "Stubborn", Script::FailDestroy),
        ("com.example.Sluggish", "Sluggish", Script::Sluggish),
    ];
    for (class, name, script) in classes {
        let journal = Arc::clone(journal);
        registry.register_fn(class, move |context| {
            Ok(Arc::new(ScriptedGuest {
                name,
                script,
                context,
                journal: Arc::clone(&journal),
            }) as Arc<dyn GuestApplication>)
        });
    }
    registry
}

#[derive(Default)]
struct RecordingHost {
    calls: Vec<String>,
    chooser: Option<Vec<String>>,
    error: Option<String>,
    exit_prompts: usize,
    key_dialog: Option<(Vec<String>, Vec<bool>)>,
    chrome: Option<ChromeState>,
    immersive: Option<bool>,
    finished: Vec<TerminationReason>,
}

impl HostWindow for RecordingHost {
    fn replace_content(&mut self, displayable: &Displayable) {
        self.calls.push(format!("content:{}", displayable.title()));
    }

    fn set_immersive(&mut self, immersive: bool) {
        self.calls.push(format!("immersive:{}", immersive));
        self.immersive = Some(immersive);
    }

    fn set_chrome(&mut self, chrome: &ChromeState) {
        self.chrome = Some(chrome.clone());
    }

    fn invalidate_menu(&mut self) {
        self.calls.push("invalidate-menu".into());
    }

    fn open_menu(&mut self) {
        self.calls.push("open-menu".into());
    }

    fn set_orientation(&mut self, orientation: Orientation) {
        self.calls.push(format!("orientation:{}", orientation));
    }

    fn set_keep_screen_on(&mut self, keep_on: bool) {
        self.calls.push(format!("keep-screen-on:{}", keep_on));
    }

    fn finish(&mut self, reason: TerminationReason) {
        self.finished.push(reason);
    }
}

impl HostDialogs for RecordingHost {
    fn show_entry_chooser(&mut self, names: &[String]) {
        self.chooser = Some(names.to_vec());
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn show_exit_confirmation(&mut self) {
        self.exit_prompts += 1;
    }

    fn show_key_visibility(&mut self, names: &[String], visible: &[bool]) {
        self.key_dialog = Some((names.to_vec(), visible.to_vec()));
    }
}

/// Overlay whose key visibility stays observable after it is boxed.
struct SharedOverlay {
    visible: Arc<Mutex<Vec<bool>>>,
    modes: Arc<Mutex<Vec<OverlayEditMode>>>,
}

impl InputOverlay for SharedOverlay {
    fn switch_edit_mode(&mut self, mode: OverlayEditMode) {
        self.modes.lock().push(mode);
    }

    fn switch_layout(&mut self) {}

    fn key_names(&self) -> Vec<String> {
        vec!["Up".into(), "Down".into(), "Fire".into()]
    }

    fn key_visibility(&self) -> Vec<bool> {
        self.visible.lock().clone()
    }

    fn set_key_visibility(&mut self, index: usize, visible: bool) {
        if let Some(slot) = self.visible.lock().get_mut(index) {
            *slot = visible;
        }
    }
}

struct Fixture {
    data: TempDir,
    module: TempDir,
    journal: Arc<Journal>,
    config: ShellConfig,
}

impl Fixture {
    fn new(entries: &[(&str, &str)]) -> Self {
        init_tracing();
        let data = TempDir::new().unwrap();
        let module = TempDir::new().unwrap();

        let mut manifest = String::from("Module-Name: Test Pack\nModule-Vendor: Example\n");
        for (i, (name, class)) in entries.iter().enumerate() {
            manifest.push_str(&format!("Entry-{}: {}, /icon.png, {}\n", i + 1, name, class));
        }
        write_module(module.path(), &manifest);

        let config = ShellConfig {
            data_dir: data.path().display().to_string(),
            cache_dir: data.path().join("cache").display().to_string(),
            ..ShellConfig::default()
        };

        Self {
            data,
            module,
            journal: Arc::new(Journal::default()),
            config,
        }
    }

    fn session(&self) -> HostSession<RecordingHost> {
        self.session_with(None)
    }

    fn session_with(&self, overlay: Option<Box<dyn InputOverlay>>) -> HostSession<RecordingHost> {
        HostSession::create(
            LaunchParams::new(self.module.path()).with_orientation(Orientation::LockedLandscape),
            &self.config,
            registry(&self.journal),
            RecordingHost::default(),
            overlay,
        )
    }
}

fn write_module(root: &Path, manifest: &str) {
    fs::create_dir_all(root.join("res")).unwrap();
    fs::write(root.join("MANIFEST.MF"), manifest).unwrap();
    fs::write(root.join("module.bin"), b"guest").unwrap();
}

/// Pump until `done` holds or two seconds pass.
fn pump_until<H, F>(session: &mut HostSession<H>, done: F) -> bool
where
    H: HostShell,
    F: Fn(&HostSession<H>) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        session.pump();
        if done(session) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

/// Wait for the guest to run without draining the channel.
fn wait_running<H: HostShell>(session: &HostSession<H>) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while session.guest_state() != GuestApplicationState::Running {
        assert!(Instant::now() < deadline, "guest never started");
        thread::sleep(Duration::from_millis(5));
    }
}

fn running<H: HostShell>(session: &HostSession<H>) -> bool {
    session.guest_state() == GuestApplicationState::Running
        && session.current_displayable().is_some()
}

/// Wait up to three seconds for a journal entry starting with `prefix`.
fn wait_journal(journal: &Journal, prefix: &str) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while journal.count(prefix) == 0 {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
    true
}

fn menu_entry(session: &HostSession<RecordingHost>, label: &str) -> MenuEntry {
    session
        .on_prepare_menu()
        .unwrap()
        .entries()
        .iter()
        .find(|e| e.label() == label)
        .cloned()
        .unwrap()
}

#[test]
fn test_single_entry_starts_without_prompt() {
    let fixture = Fixture::new(&[("One", "com.example.One")]);
    let mut session = fixture.session();

    assert!(pump_until(&mut session, running));
    assert_eq!(session.phase(), SessionPhase::Started);
    assert!(session.host().chooser.is_none());
    assert!(session.host().error.is_none());
    assert_eq!(fixture.journal.entries(), vec!["start:One"]);

    let calls = &session.host().calls;
    assert_eq!(calls[0], "orientation:locked-landscape");
    assert!(!calls.iter().any(|c| c.starts_with("keep-screen-on")));
    assert_eq!(session.module().unwrap().module_name, "Test Pack");
}

#[test]
fn test_multiple_entries_prompt_in_manifest_order() {
    let fixture = Fixture::new(&[
        ("One", "com.example.One"),
        ("Two", "com.example.Two"),
        ("Burst", "com.example.Burst"),
    ]);
    let mut session = fixture.session();

    assert_eq!(session.phase(), SessionPhase::AwaitingEntry);
    assert_eq!(
        session.host().chooser,
        Some(vec!["One".to_string(), "Two".to_string(), "Burst".to_string()])
    );
    assert_eq!(session.guest_state(), GuestApplicationState::NotStarted);

    session.on_entry_chosen(9);
    assert_eq!(session.guest_state(), GuestApplicationState::NotStarted);

    session.on_entry_chosen(1);
    assert!(pump_until(&mut session, running));
    assert_eq!(fixture.journal.entries(), vec!["start:Two"]);
}

#[test]
fn test_dismissed_chooser_finishes_session() {
    let fixture = Fixture::new(&[("One", "com.example.One"), ("Two", "com.example.Two")]);
    let mut session = fixture.session();

    session.on_entry_selection_dismissed();
    assert_eq!(
        session.termination(),
        Some(TerminationReason::SelectionCancelled)
    );
    assert_eq!(
        session.host().finished,
        vec![TerminationReason::SelectionCancelled]
    );
    assert!(fixture.journal.entries().is_empty());
}

#[test]
fn test_zero_entries_is_session_start_failure() {
    let fixture = Fixture::new(&[]);
    let mut session = fixture.session();

    assert_eq!(session.phase(), SessionPhase::Failed);
    let message = session.host().error.clone().unwrap();
    assert!(message.contains("MANIFEST.MF"), "{}", message);
    assert_eq!(session.guest_state(), GuestApplicationState::NotStarted);
    assert_eq!(session.bridge().join_workers(), 0);
    assert!(!fixture.data.path().join("module_staging").exists());
    assert!(session.host().finished.is_empty());

    session.on_error_dismissed();
    assert_eq!(
        session.host().finished,
        vec![TerminationReason::SessionStartFailed]
    );
}

#[test]
fn test_unknown_class_shows_error() {
    let fixture = Fixture::new(&[("Ghost", "com.example.Ghost")]);
    let mut session = fixture.session();

    assert_eq!(session.phase(), SessionPhase::Failed);
    assert!(session.host().error.is_some());
    assert_eq!(session.guest_state(), GuestApplicationState::Destroyed);

    session.on_error_dismissed();
    session.on_error_dismissed();
    assert_eq!(session.host().finished.len(), 1);
}

#[test]
fn test_last_set_current_wins() {
    let fixture = Fixture::new(&[("Burst", "com.example.Burst")]);
    let mut session = fixture.session();

    wait_running(&session);
    assert_eq!(session.pump(), 3);
    assert_eq!(session.current_displayable().unwrap().title(), "Menu");

    let contents: Vec<&String> = session
        .host()
        .calls
        .iter()
        .filter(|c| c.starts_with("content:"))
        .collect();
    assert_eq!(contents, vec!["content:A", "content:B", "content:Menu"]);

    let menu = session.on_prepare_menu().unwrap();
    let labels: Vec<&str> = menu.entries().iter().map(MenuEntry::label).collect();
    assert_eq!(labels, vec!["Exit", "Play", "Quit"]);
    assert_eq!(session.host().immersive, Some(false));
}

#[test]
fn test_surface_to_form_in_one_drain() {
    let fixture = Fixture::new(&[("Swap", "com.example.Swap")]);
    let mut session = fixture.session();

    wait_running(&session);
    assert_eq!(session.pump(), 2);

    assert_eq!(session.current_displayable().unwrap().title(), "Scores");
    assert_eq!(session.host().immersive, Some(false));
    assert_eq!(
        session.host().chrome,
        Some(ChromeState::shown("Scores", 56))
    );
}

#[test]
fn test_startup_failure_terminates_once() {
    let fixture = Fixture::new(&[("Broken", "com.example.Broken")]);
    let mut session = fixture.session();

    assert_eq!(
        session.run(Some(Duration::from_secs(2))),
        Some(TerminationReason::StartupFailed)
    );
    session.bridge().join_workers();
    session.pump();

    assert_eq!(session.guest_state(), GuestApplicationState::Destroyed);
    assert_eq!(session.host().finished, vec![TerminationReason::StartupFailed]);
    assert_eq!(fixture.journal.count("destroy"), 0);
    assert!(session.module().unwrap().context.is_discarded());
}

#[test]
fn test_exit_confirmation_destroys_off_ui_thread() {
    let fixture = Fixture::new(&[("One", "com.example.One")]);
    let mut session = fixture.session();
    assert!(pump_until(&mut session, running));

    session.on_back_key();
    assert!(session.host().calls.contains(&"open-menu".to_string()));

    let exit = menu_entry(&session, "Exit");
    session.on_menu_selected(&exit);
    assert_eq!(session.host().exit_prompts, 1);

    session.on_exit_declined();
    assert_eq!(session.guest_state(), GuestApplicationState::Running);

    session.on_exit_confirmed();
    session.on_exit_confirmed();
    assert_eq!(
        session.run(Some(Duration::from_secs(2))),
        Some(TerminationReason::HostShutdown)
    );
    session.bridge().join_workers();

    assert_eq!(session.guest_state(), GuestApplicationState::Destroyed);
    assert_eq!(fixture.journal.count("destroy"), 1);
    assert!(fixture
        .journal
        .entries()
        .contains(&"destroy:guest-destroy".to_string()));
    assert_eq!(session.host().finished, vec![TerminationReason::HostShutdown]);
}

#[test]
fn test_failing_destroy_still_finishes() {
    let fixture = Fixture::new(&[("Stubborn", "com.example.Stubborn")]);
    let mut session = fixture.session();
    assert!(pump_until(&mut session, running));

    session.on_exit_confirmed();
    assert_eq!(
        session.run(Some(Duration::from_secs(2))),
        Some(TerminationReason::HostShutdown)
    );
    assert_eq!(session.guest_state(), GuestApplicationState::Destroyed);
    assert_eq!(fixture.journal.count("destroy"), 1);
}

#[test]
fn test_stale_guest_entry_is_ignored() {
    let fixture = Fixture::new(&[("One", "com.example.One")]);
    let mut session = fixture.session();
    assert!(pump_until(&mut session, running));

    let quit = menu_entry(&session, "Quit");
    let play = menu_entry(&session, "Play");
    session.on_menu_selected(&play);
    assert!(pump_until(&mut session, |s| {
        s.current_displayable().map(|d| d.title()) == Some("Playfield")
    }));
    assert_eq!(session.host().immersive, Some(true));
    assert_eq!(session.on_prepare_menu().unwrap().guest_entries().count(), 2);

    // The menu form's entries must not reach the playfield's own commands.
    session.on_menu_selected(&play);
    session.on_menu_selected(&quit);
    assert_eq!(session.run(Some(Duration::from_millis(200))), None);
    assert_eq!(fixture.journal.count("command"), 1);
    assert_eq!(session.guest_state(), GuestApplicationState::Running);

    let delete = menu_entry(&session, "Delete save");
    session.on_menu_selected(&delete);
    assert!(wait_journal(&fixture.journal, "command:Delete save@Playfield"));
}

#[test]
fn test_command_listener_runs_off_ui_thread() {
    let fixture = Fixture::new(&[("Sluggish", "com.example.Sluggish")]);
    let mut session = fixture.session();
    assert!(pump_until(&mut session, running));

    let think = menu_entry(&session, "Think");
    let started = Instant::now();
    session.on_menu_selected(&think);
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(fixture.journal.count("command"), 0);

    assert!(wait_journal(&fixture.journal, "command:Think@Busy on guest-events"));
}

#[test]
fn test_quit_command_ends_session() {
    let fixture = Fixture::new(&[("One", "com.example.One")]);
    let mut session = fixture.session();
    assert!(pump_until(&mut session, running));

    let quit = menu_entry(&session, "Quit");
    let play = menu_entry(&session, "Play");
    session.on_menu_selected(&quit);
    assert_eq!(
        session.run(Some(Duration::from_secs(2))),
        Some(TerminationReason::GuestRequested)
    );
    session.bridge().join_workers();

    assert_eq!(fixture.journal.count("command:Quit@Menu on guest-events"), 1);
    assert_eq!(fixture.journal.count("destroy"), 1);
    assert_eq!(session.host().exit_prompts, 0);

    // The guest is gone; its commands are no longer delivered.
    session.on_menu_selected(&play);
    thread::sleep(Duration::from_millis(100));
    assert_eq!(fixture.journal.count("command:Play"), 0);
}

#[test]
fn test_first_foreground_is_swallowed() {
    let fixture = Fixture::new(&[("One", "com.example.One")]);
    let mut session = fixture.session();
    assert!(pump_until(&mut session, running));

    session.on_foreground();
    session.on_background();
    session.on_foreground();
    session.on_stop();

    assert_eq!(
        fixture.journal.entries(),
        vec!["start:One", "pause", "resume", "stopped"]
    );
}

#[test]
fn test_cache_files_removed_at_creation() {
    let fixture = Fixture::new(&[("One", "com.example.One")]);
    let cache = fixture.data.path().join("cache");
    fs::create_dir_all(cache.join("nested")).unwrap();
    fs::write(cache.join("old.tmp"), b"stale").unwrap();

    let _session = fixture.session();
    assert!(!cache.join("old.tmp").exists());
    assert!(cache.join("nested").is_dir());
}

#[test]
fn test_keep_screen_on_preference() {
    let mut fixture = Fixture::new(&[("One", "com.example.One")]);
    fixture.config.preferences.keep_screen_on = true;

    let session = fixture.session();
    assert!(session
        .host()
        .calls
        .contains(&"keep-screen-on:true".to_string()));
}

#[test]
fn test_focus_regain_over_surface() {
    let fixture = Fixture::new(&[("Canvas", "com.example.Canvas")]);
    let mut session = fixture.session();
    assert!(pump_until(&mut session, running));

    session.host_mut().calls.clear();
    session.on_window_focus_changed(false);
    assert!(session.host().calls.is_empty());

    session.on_window_focus_changed(true);
    assert_eq!(session.host().calls, vec!["immersive:true"]);
    assert_eq!(session.host().chrome, Some(ChromeState::hidden()));
}

#[test]
fn test_overlay_menu_and_key_visibility() {
    let fixture = Fixture::new(&[("Canvas", "com.example.Canvas")]);
    let visible = Arc::new(Mutex::new(vec![true, true, true]));
    let modes = Arc::new(Mutex::new(Vec::new()));
    let overlay = SharedOverlay {
        visible: Arc::clone(&visible),
        modes: Arc::clone(&modes),
    };

    let mut session = fixture.session_with(Some(Box::new(overlay)));
    assert!(pump_until(&mut session, running));

    let menu = session.on_prepare_menu().unwrap();
    assert!(menu.has_action(HostAction::HideButtons));

    session.on_menu_selected(&MenuEntry::host(HostAction::EditKeys));
    assert_eq!(*modes.lock(), vec![OverlayEditMode::Keys]);

    session.on_menu_selected(&MenuEntry::host(HostAction::HideButtons));
    let (names, shown) = session.host().key_dialog.clone().unwrap();
    assert_eq!(names, vec!["Up", "Down", "Fire"]);
    assert_eq!(shown, vec![true, true, true]);

    session.on_key_visibility_changed(2, false);
    session.on_key_visibility_changed(7, false);
    assert_eq!(*visible.lock(), vec![true, true, false]);
}
