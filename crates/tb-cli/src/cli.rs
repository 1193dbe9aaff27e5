//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Balance of Timewarrior hours against an allotment schedule.
///
/// Runs as a Timewarrior report extension: reads the extension input on
/// stdin and prints hours spent vs. hours allotted per tag.
#[derive(Debug, Parser)]
#[command(name = "balance", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Allotment file. Defaults to `balance.conf` in the Timewarrior data
    /// directory.
    #[arg(short, long)]
    pub allotments: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}
