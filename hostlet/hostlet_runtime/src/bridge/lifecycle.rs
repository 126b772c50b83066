//! Guest lifecycle bridge.
//!
//! Translates host lifecycle events into guest lifecycle calls and owns the
//! [`GuestApplicationState`] machine:
//!
//! ```text
//! NotStarted -> Starting -> Running -> Destroyed
//!      |            |                      ^
//!      +------------+----------------------+
//! ```
//!
//! The startup and destroy hooks run on their own worker threads and may
//! block indefinitely; pause, resume and stop notifications run on the
//! calling (UI-owning) thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use hostlet_concurrency::{run_guarded, spawn_worker, UiSender, WorkerHandle};
use hostlet_core::{
    ClassLoadError, GuestApplication, GuestApplicationState, GuestError, HostVisibility,
    LifecycleCapability, Result, SessionError, SessionId, TerminationReason,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::UiEvent;

/// Name of the thread running the startup hook.
pub const STARTUP_THREAD: &str = "guest-startup";

/// Name of the thread running the destroy hook.
pub const DESTROY_THREAD: &str = "guest-destroy";

/// Owns the lifecycle of the single guest instance of a session.
pub struct LifecycleBridge {
    me: Weak<LifecycleBridge>,
    session_id: SessionId,
    state: Mutex<GuestApplicationState>,
    guest: Mutex<Option<Arc<dyn GuestApplication>>>,
    loaded: AtomicBool,
    swallow_foreground: AtomicBool,
    destroy_requested: AtomicBool,
    termination_requested: AtomicBool,
    events: UiSender<UiEvent>,
    workers: Mutex<Vec<WorkerHandle>>,
}

impl LifecycleBridge {
    /// Create a bridge posting termination requests to `events`.
    pub fn new(session_id: SessionId, events: UiSender<UiEvent>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            session_id,
            state: Mutex::new(GuestApplicationState::NotStarted),
            guest: Mutex::new(None),
            loaded: AtomicBool::new(false),
            swallow_foreground: AtomicBool::new(false),
            destroy_requested: AtomicBool::new(false),
            termination_requested: AtomicBool::new(false),
            events,
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Current guest state.
    pub fn state(&self) -> GuestApplicationState {
        *self.state.lock()
    }

    /// Whether the startup hook completed successfully. Never reset.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Whether a termination request has been posted.
    pub fn termination_requested(&self) -> bool {
        self.termination_requested.load(Ordering::Acquire)
    }

    /// Move to `Starting`, build the guest with `instantiate` and run its
    /// startup hook on the [`STARTUP_THREAD`] worker.
    ///
    /// An instantiation failure moves the bridge to `Destroyed` and is
    /// returned; it is a session-start failure. Startup hook failures are
    /// handled on the worker and never reach the caller.
    pub fn start<F>(&self, class_name: &str, instantiate: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<Arc<dyn GuestApplication>, ClassLoadError>,
    {
        self.transition(GuestApplicationState::Starting)?;

        let guest = match instantiate() {
            Ok(guest) => guest,
            Err(e) => {
                error!(
                    session = %self.session_id,
                    class = %class_name,
                    error = %e,
                    "guest instantiation failed"
                );
                self.mark_destroyed();
                return Err(e.into());
            }
        };
        *self.guest.lock() = Some(Arc::clone(&guest));

        let Some(bridge) = self.me.upgrade() else {
            self.mark_destroyed();
            return Err(SessionError::Startup(GuestError::failed("lifecycle bridge dropped")));
        };
        let class = class_name.to_string();
        match spawn_worker(STARTUP_THREAD, move || bridge.run_startup(&class, guest)) {
            Ok(handle) => {
                self.workers.lock().push(handle);
                Ok(())
            }
            Err(e) => {
                error!(session = %self.session_id, error = %e, "failed to spawn startup worker");
                self.mark_destroyed();
                Err(SessionError::Startup(GuestError::failed(e.to_string())))
            }
        }
    }

    fn run_startup(&self, class_name: &str, guest: Arc<dyn GuestApplication>) {
        info!(session = %self.session_id, class = %class_name, "starting guest");

        match run_guarded(|| guest.start()) {
            Ok(()) => {
                let mut state = self.state.lock();
                if *state == GuestApplicationState::Starting {
                    *state = GuestApplicationState::Running;
                    self.swallow_foreground.store(true, Ordering::Release);
                    self.loaded.store(true, Ordering::Release);
                    info!(session = %self.session_id, class = %class_name, "guest running");
                } else {
                    debug!(
                        session = %self.session_id,
                        state = %*state,
                        "startup finished after teardown"
                    );
                }
            }
            Err(e) => {
                let err = SessionError::Startup(e);
                error!(
                    session = %self.session_id,
                    class = %class_name,
                    error = %err,
                    "guest startup failed"
                );
                self.mark_destroyed();
                self.post_termination(TerminationReason::StartupFailed);
            }
        }
    }

    /// Forward a host visibility change to a running guest.
    ///
    /// The first foreground after startup is swallowed: a freshly started
    /// guest is already resumed.
    pub fn on_visibility(&self, visibility: HostVisibility) {
        let Some(guest) = self.running_guest() else {
            return;
        };

        match visibility {
            HostVisibility::Background => {
                debug!(session = %self.session_id, "pausing guest");
                if let Err(e) = run_guarded(|| {
                    guest.pause();
                    Ok(())
                }) {
                    warn!(session = %self.session_id, error = %e, "guest pause hook failed");
                }
            }
            HostVisibility::Foreground => {
                if self.swallow_foreground.swap(false, Ordering::AcqRel) {
                    debug!(session = %self.session_id, "first foreground swallowed");
                    return;
                }
                debug!(session = %self.session_id, "resuming guest");
                if let Err(e) = run_guarded(|| {
                    guest.resume();
                    Ok(())
                }) {
                    warn!(session = %self.session_id, error = %e, "guest resume hook failed");
                }
            }
        }
    }

    /// The host window is no longer visible at all.
    pub fn on_stop(&self) {
        let Some(guest) = self.running_guest() else {
            return;
        };
        if let Err(e) = run_guarded(|| {
            guest.stopped();
            Ok(())
        }) {
            warn!(session = %self.session_id, error = %e, "guest stop hook failed");
        }
    }

    /// Tear the guest down on the [`DESTROY_THREAD`] worker and then post
    /// a termination request with `reason`.
    ///
    /// Returns `false` when a destroy is already in flight or the guest is
    /// already destroyed; the destroy hook runs at most once.
    pub fn request_destroy(&self, reason: TerminationReason) -> bool {
        {
            let state = self.state.lock();
            if state.is_terminal() {
                debug!(session = %self.session_id, "destroy ignored, guest already destroyed");
                return false;
            }
            if self.destroy_requested.swap(true, Ordering::AcqRel) {
                debug!(session = %self.session_id, "destroy already in flight");
                return false;
            }
        }

        // The guest's context holds this bridge; releasing the slot here
        // breaks that cycle once destroy completes.
        let guest = self.guest.lock().take();
        let Some(bridge) = self.me.upgrade() else {
            return false;
        };

        info!(session = %self.session_id, %reason, "destroying guest");
        match spawn_worker(DESTROY_THREAD, move || bridge.run_destroy(guest, reason)) {
            Ok(handle) => self.workers.lock().push(handle),
            Err(e) => {
                error!(session = %self.session_id, error = %e, "failed to spawn destroy worker");
                self.mark_destroyed();
                self.post_termination(reason);
            }
        }
        true
    }

    fn run_destroy(&self, guest: Option<Arc<dyn GuestApplication>>, reason: TerminationReason) {
        if let Some(guest) = guest {
            if let Err(e) = run_guarded(|| guest.destroy()) {
                warn!(session = %self.session_id, error = %e, "guest destroy hook failed");
            }
        }
        self.mark_destroyed();
        self.post_termination(reason);
    }

    /// Post a termination request unless one was already posted.
    fn post_termination(&self, reason: TerminationReason) {
        if self.termination_requested.swap(true, Ordering::AcqRel) {
            debug!(session = %self.session_id, %reason, "termination already requested");
            return;
        }
        info!(session = %self.session_id, %reason, "requesting host termination");
        if let Err(e) = self.events.post(UiEvent::Terminate(reason)) {
            warn!(session = %self.session_id, error = %e, "termination request dropped");
        }
    }

    /// Join every worker spawned so far, including workers spawned while
    /// joining. Blocks; never call from the UI-owning thread.
    pub fn join_workers(&self) -> usize {
        let mut joined = 0;
        loop {
            let batch = std::mem::take(&mut *self.workers.lock());
            if batch.is_empty() {
                return joined;
            }
            for handle in batch {
                handle.join();
                joined += 1;
            }
        }
    }

    fn transition(&self, to: GuestApplicationState) -> Result<()> {
        let mut state = self.state.lock();
        if !state.can_transition_to(to) {
            return Err(SessionError::InvalidTransition { from: *state, to });
        }
        debug!(session = %self.session_id, from = %*state, %to, "state transition");
        *state = to;
        Ok(())
    }

    fn mark_destroyed(&self) {
        {
            let mut state = self.state.lock();
            if *state != GuestApplicationState::Destroyed {
                debug!(session = %self.session_id, from = %*state, "guest destroyed");
                *state = GuestApplicationState::Destroyed;
            }
        }
        self.guest.lock().take();
    }

    fn running_guest(&self) -> Option<Arc<dyn GuestApplication>> {
        let state = self.state.lock();
        if *state != GuestApplicationState::Running || !self.is_loaded() {
            return None;
        }
        self.guest.lock().clone()
    }
}

impl LifecycleCapability for LifecycleBridge {
    fn request_termination(&self) {
        debug!(session = %self.session_id, "guest requested termination");
        self.request_destroy(TerminationReason::GuestRequested);
    }
}

impl std::fmt::Debug for LifecycleBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleBridge")
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
