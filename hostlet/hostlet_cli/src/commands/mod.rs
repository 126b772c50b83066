//! Subcommand implementations.
//!
//! Each command returns the process exit code on completion; errors bubble
//! up as `anyhow::Error` and are printed by `main`.

pub mod entries;
pub mod run;
