//! Command-line interface for genre-radio.
//!
//! Provides commands for browsing the genre catalog and exercising track
//! acquisition against the real provider.

mod commands;

pub use commands::{Cli, Commands, run_command};
