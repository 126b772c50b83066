//! Guest worker threads.
//!
//! Guest startup and teardown hooks may block for an unbounded time, so each
//! runs on its own named OS thread rather than on a shared pool. Nothing ever
//! joins these threads from the UI-owning thread.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use hostlet_core::GuestError;
use thiserror::Error;
use tracing::{debug, error};

/// Error when spawning a worker
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The OS refused to create the thread
    #[error("failed to spawn worker {name}: {source}")]
    Spawn {
        /// Thread name
        name: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Handle to a spawned worker.
#[derive(Debug)]
pub struct WorkerHandle {
    name: String,
    handle: JoinHandle<()>,
    finished: Arc<AtomicBool>,
}

impl WorkerHandle {
    /// Thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the worker body has returned.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Block until the worker exits. Returns `false` if the body panicked
    /// past its own guard. Must not be called from the UI-owning thread.
    pub fn join(self) -> bool {
        match self.handle.join() {
            Ok(()) => true,
            Err(_) => {
                error!(worker = %self.name, "worker thread panicked");
                false
            }
        }
    }
}

/// Spawn a named worker thread running `body`.
pub fn spawn_worker<F>(name: &str, body: F) -> Result<WorkerHandle, WorkerError>
where
    F: FnOnce() + Send + 'static,
{
    let finished = Arc::new(AtomicBool::new(false));
    let done = Arc::clone(&finished);
    let thread_name = name.to_string();

    let handle = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            debug!("worker started");
            body();
            done.store(true, Ordering::Release);
            debug!("worker finished");
        })
        .map_err(|source| WorkerError::Spawn {
            name: thread_name.clone(),
            source,
        })?;

    Ok(WorkerHandle {
        name: thread_name,
        handle,
        finished,
    })
}

/// Run a guest hook, converting a panic into [`GuestError::Panicked`].
pub fn run_guarded<T, F>(hook: F) -> Result<T, GuestError>
where
    F: FnOnce() -> Result<T, GuestError>,
{
    match catch_unwind(AssertUnwindSafe(hook)) {
        Ok(result) => result,
        Err(payload) => Err(GuestError::from_panic(payload)),
    }
}
