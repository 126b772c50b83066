//! Utility helpers shared by the hostlet crates.

pub mod logging;

pub use logging::{init_logging, LogLevel};
