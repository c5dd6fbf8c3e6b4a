//! Touchpoint tracker CLI library.
//!
//! This crate provides the CLI interface: recording events and presenting
//! reconciled case metrics.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
