//! CLI module for the configuration generator.
//!
//! This module provides the command-line interface for generating
//! runtime configuration files.

mod commands;
mod output;

pub use commands::{Cli, Commands, CommonArgs, OutputFormat};
pub use output::OutputFormatter;
