#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Hostlet Concurrency
//!
//! Threading primitives for the hostlet host:
//!
//! - A FIFO marshaling channel carrying requests from any thread to the
//!   single UI-owning thread
//! - Named worker threads that run guest hooks with panic isolation
//! - An event queue drained by its own worker, carrying work from the
//!   UI-owning thread to guest code

/// Multi-producer, single-consumer channel into the UI-owning thread
pub mod channel;

/// FIFO queue consumed by a dedicated worker thread
pub mod queue;

/// Dedicated worker threads for guest startup and teardown
pub mod worker;

pub use channel::{marshal_channel, ChannelError, UiReceiver, UiSender};
pub use queue::EventQueue;
pub use worker::{run_guarded, spawn_worker, WorkerError, WorkerHandle};
