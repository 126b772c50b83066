//! `hostlet run`

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use hostlet_core::{LaunchParams, Orientation, TerminationReason};
use hostlet_isolation::ModuleLoader;
use hostlet_runtime::{HostSession, ShellConfig};
use tracing::{info, warn};

use crate::demo;
use crate::headless::{HeadlessHost, PendingDialog};

/// Grace period for the destroy hook after the run timeout.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Arguments of `hostlet run`.
pub struct RunArgs {
    pub module: PathBuf,
    pub orientation: Orientation,
    pub data_dir: Option<PathBuf>,
    pub choose: Option<usize>,
    pub timeout: u64,
}

/// Run one headless session. Exits 0 when the session ended normally and
/// 1 when it failed to start.
pub fn execute(mut config: ShellConfig, args: RunArgs) -> Result<i32> {
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.display().to_string();
        config.cache_dir = data_dir.join("cache").display().to_string();
        config.validate()?;
    }

    let registry = demo::registry();
    let loader = ModuleLoader::new(&config.data_dir, config.layout.clone(), registry.clone())
        .with_packaged_classes(demo::Aliases::new(registry));
    let launch = LaunchParams::new(&args.module).with_orientation(args.orientation);
    let mut session =
        HostSession::create_with_loader(launch, &config, loader, HeadlessHost::new(), None);
    answer_dialogs(&mut session, args.choose);

    if !session.is_finished() {
        session.on_foreground();
        let reason = session.run(Some(Duration::from_secs(args.timeout)));
        if reason.is_none() {
            info!("run timed out, exiting on the user's behalf");
            session.on_exit_confirmed();
            if session.run(Some(SHUTDOWN_GRACE)).is_none() {
                warn!("guest did not shut down in time");
            }
        }
    }

    let code = match session.host().finished() {
        Some(TerminationReason::HostShutdown | TerminationReason::GuestRequested) => 0,
        _ => 1,
    };
    Ok(code)
}

/// Answer the dialogs a headless host cannot show, including dialogs
/// raised while answering.
fn answer_dialogs(session: &mut HostSession<HeadlessHost>, choose: Option<usize>) {
    loop {
        let dialogs = session.host_mut().take_dialogs();
        if dialogs.is_empty() {
            return;
        }
        for dialog in dialogs {
            match dialog {
                PendingDialog::EntryChooser(names) => match choose {
                    Some(n) if (1..=names.len()).contains(&n) => {
                        println!("chose: {}", names[n - 1]);
                        session.on_entry_chosen(n - 1);
                    }
                    _ => {
                        println!("no entry chosen, pass --choose 1..{}", names.len());
                        session.on_entry_selection_dismissed();
                    }
                },
                PendingDialog::Error(_) => session.on_error_dismissed(),
                PendingDialog::ConfirmExit => session.on_exit_confirmed(),
            }
        }
    }
}
