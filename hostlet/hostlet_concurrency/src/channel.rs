//! Marshaling channel into the UI-owning thread.
//!
//! Any number of threads hold a [`UiSender`]; exactly one thread, the UI
//! owner, holds the [`UiReceiver`] and drains it. The channel is unbounded so
//! posting never blocks a guest thread, and crossbeam's channel guarantees
//! that events are received in the order they were sent.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Error when posting to or receiving from the channel
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The other side has been dropped
    #[error("channel is closed")]
    Closed,
}

/// Create a named channel.
pub fn marshal_channel<E: Send>(name: impl Into<String>) -> (UiSender<E>, UiReceiver<E>) {
    let (sender, receiver) = unbounded();
    let name: Arc<str> = Arc::from(name.into());
    (
        UiSender {
            sender,
            name: Arc::clone(&name),
        },
        UiReceiver { receiver, name },
    )
}

/// Producer handle; cheap to clone and usable from any thread.
pub struct UiSender<E> {
    sender: Sender<E>,
    name: Arc<str>,
}

impl<E> Clone for UiSender<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

impl<E: Send> UiSender<E> {
    /// Enqueue an event. Never blocks.
    pub fn post(&self, event: E) -> Result<(), ChannelError> {
        self.sender.send(event).map_err(|_| ChannelError::Closed)?;
        trace!(channel = %self.name, "event posted");
        Ok(())
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<E> fmt::Debug for UiSender<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiSender").field("name", &self.name).finish()
    }
}

/// Consumer handle owned by the UI thread.
pub struct UiReceiver<E> {
    receiver: Receiver<E>,
    name: Arc<str>,
}

impl<E> UiReceiver<E> {
    /// Process every queued event in FIFO order, including events posted
    /// while draining, and return how many were handled. Does not wait for
    /// new events once the queue is empty.
    pub fn drain<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(E),
    {
        let mut handled = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    handler(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if handled > 0 {
            trace!(channel = %self.name, handled, "drained");
        }
        handled
    }

    /// Wait up to `timeout` for the next event. `Ok(None)` on timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<E>, ChannelError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ChannelError::Closed),
        }
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<E> fmt::Debug for UiReceiver<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiReceiver")
            .field("name", &self.name)
            .field("pending", &self.receiver.len())
            .finish()
    }
}
