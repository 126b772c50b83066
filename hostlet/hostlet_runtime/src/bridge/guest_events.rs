//! Delivery of command actions to the guest.
//!
//! Command listeners are guest code. They run on the session's
//! `guest-events` thread, one action at a time in selection order, never on
//! the UI-owning thread. The thread is spawned on the first action.

use std::sync::Arc;

use hostlet_concurrency::{run_guarded, EventQueue, WorkerHandle};
use hostlet_core::{CommandEntry, CommandListener, Displayable, SessionError, SessionId};
use tracing::{debug, error, warn};

/// Name of the thread running command listeners.
pub const GUEST_EVENTS_THREAD: &str = "guest-events";

/// A command selected in the host menu, bound for its listener.
pub struct CommandAction {
    listener: Arc<dyn CommandListener>,
    command: CommandEntry,
    displayable: Arc<Displayable>,
}

impl CommandAction {
    /// Action for `command` of `displayable`.
    pub fn new(
        listener: Arc<dyn CommandListener>,
        command: CommandEntry,
        displayable: Arc<Displayable>,
    ) -> Self {
        Self {
            listener,
            command,
            displayable,
        }
    }

    /// Selected command.
    pub fn command(&self) -> &CommandEntry {
        &self.command
    }

    fn deliver(self) {
        debug!(command = %self.command.id, label = %self.command.label, "command action");
        let result = run_guarded(|| {
            self.listener.command_action(&self.command, &self.displayable);
            Ok(())
        });
        if let Err(e) = result {
            warn!(command = %self.command.id, error = %e, "command listener failed");
        }
    }
}

impl std::fmt::Debug for CommandAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandAction")
            .field("command", &self.command)
            .field("displayable", &self.displayable.id())
            .finish()
    }
}

/// Per-session queue of command actions.
#[derive(Debug)]
pub struct GuestEvents {
    session_id: SessionId,
    queue: Option<EventQueue<CommandAction>>,
    closed: bool,
}

impl GuestEvents {
    /// Queue for `session_id`. No thread exists until the first post.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            queue: None,
            closed: false,
        }
    }

    /// Hand `action` to the guest. Returns once it is queued.
    pub fn post(&mut self, action: CommandAction) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::ChannelClosed);
        }
        if self.queue.is_none() {
            let queue = EventQueue::spawn(GUEST_EVENTS_THREAD, CommandAction::deliver)
                .map_err(|e| {
                    error!(session = %self.session_id, error = %e, "cannot start guest events");
                    SessionError::ChannelClosed
                })?;
            self.queue = Some(queue);
        }

        match &self.queue {
            Some(queue) => queue.post(action).map_err(|_| SessionError::ChannelClosed),
            None => Err(SessionError::ChannelClosed),
        }
    }

    /// Whether the worker thread has been spawned.
    pub fn is_running(&self) -> bool {
        self.queue.is_some()
    }

    /// Refuse further actions. Queued actions are still delivered; the
    /// returned handle, if any, waits for them and must not be joined on
    /// the UI-owning thread.
    pub fn close(&mut self) -> Option<WorkerHandle> {
        self.closed = true;
        self.queue.take().map(EventQueue::close)
    }
}
