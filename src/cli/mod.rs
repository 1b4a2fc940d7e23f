//! CLI module
//!
//! Command-line interface for running the job.
//!
//! # Commands
//!
//! - `run` - Run both pipelines (the default)
//! - `plan` - List matched input files
//! - `show-config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
