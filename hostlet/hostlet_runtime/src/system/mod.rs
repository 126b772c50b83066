//! Host shell configuration.

pub mod config;

pub use config::{ConfigError, Preferences, ShellConfig};
