//! Timewarrior balance report extension.
//!
//! This crate provides the CLI interface around `tb-core`: reading the
//! extension input, locating the allotment file and rendering the report.

mod cli;
pub mod commands;
mod config;
pub mod render;
pub mod timew;

pub use cli::Cli;
pub use config::{Config, OutputFormat};
