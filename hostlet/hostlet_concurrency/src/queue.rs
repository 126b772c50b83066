//! Event queue drained by its own worker thread.
//!
//! The mirror image of the marshaling channel: any thread posts, and a
//! dedicated named worker consumes events one at a time in posting order.
//! Posting never blocks, so the UI-owning thread can hand work to guest
//! code without waiting for it.

use crossbeam_channel::{unbounded, Sender};
use std::fmt;
use tracing::trace;

use crate::channel::ChannelError;
use crate::worker::{spawn_worker, WorkerError, WorkerHandle};

/// Unbounded FIFO queue with a single consumer thread.
pub struct EventQueue<E> {
    name: String,
    sender: Sender<E>,
    worker: WorkerHandle,
}

impl<E: Send + 'static> EventQueue<E> {
    /// Spawn the worker `name` and hand it every posted event.
    ///
    /// The worker exits once the queue is closed and every event posted
    /// before that has been handled.
    pub fn spawn<F>(name: &str, mut handler: F) -> Result<Self, WorkerError>
    where
        F: FnMut(E) + Send + 'static,
    {
        let (sender, receiver) = unbounded::<E>();
        let worker = spawn_worker(name, move || {
            for event in receiver.iter() {
                handler(event);
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            sender,
            worker,
        })
    }

    /// Enqueue an event. Never blocks.
    pub fn post(&self, event: E) -> Result<(), ChannelError> {
        self.sender.send(event).map_err(|_| ChannelError::Closed)?;
        trace!(queue = %self.name, "event queued");
        Ok(())
    }

    /// Number of events not yet taken by the worker.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Queue name, also the worker thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop accepting events. Already queued events are still handled; the
    /// returned handle lets a non-UI thread wait for that.
    pub fn close(self) -> WorkerHandle {
        drop(self.sender);
        self.worker
    }
}

impl<E> fmt::Debug for EventQueue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("name", &self.name)
            .field("pending", &self.sender.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_events_handled_in_order_on_worker() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let queue = EventQueue::spawn("test-events", move |event: u32| {
            let thread = thread::current().name().map(str::to_string);
            sink.lock().unwrap().push((event, thread));
        })
        .unwrap();
        assert_eq!(queue.name(), "test-events");

        for event in 0..10 {
            queue.post(event).unwrap();
        }
        assert!(queue.close().join());

        let seen = seen.lock().unwrap();
        let events: Vec<u32> = seen.iter().map(|(e, _)| *e).collect();
        assert_eq!(events, (0..10).collect::<Vec<_>>());
        assert!(seen
            .iter()
            .all(|(_, t)| t.as_deref() == Some("test-events")));
    }

    #[test]
    fn test_post_does_not_wait_for_handler() {
        let queue = EventQueue::spawn("test-slow", |_: ()| {
            thread::sleep(Duration::from_millis(300));
        })
        .unwrap();

        let started = Instant::now();
        queue.post(()).unwrap();
        queue.post(()).unwrap();
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(queue.close().join());
    }
}
