//! The balance report: extension input in, rendered comparison out.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tb_core::{Balance, parse_document};

use crate::config::{Config, OutputFormat};
use crate::timew::{self, TimewInput};

/// Allotment file name inside the Timewarrior data directory.
pub const ALLOTMENTS_FILE: &str = "balance.conf";

/// Options for a single report run.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Allotment file given on the command line.
    pub allotments: Option<PathBuf>,
    /// Force JSON output regardless of configuration.
    pub json: bool,
}

/// Reads extension input from `input` and renders the balance report.
///
/// `now` closes an open-ended report and intervals still being tracked.
pub fn run<R: Read>(
    input: R,
    now: DateTime<Utc>,
    options: &ReportOptions,
    config: &Config,
) -> Result<String> {
    let timew = timew::read_input(input, now)?;
    generate(&timew, options, config)
}

/// Renders the balance report for already parsed extension input.
pub fn generate(timew: &TimewInput, options: &ReportOptions, config: &Config) -> Result<String> {
    let path = allotments_path(options, config, timew)?;
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("missing configuration file {}", path.display()))?;
    let document = parse_document(&source, timew.window.end)
        .with_context(|| format!("invalid allotments in {}", path.display()))?;
    tracing::debug!(path = %path.display(), tags = document.len(), "loaded allotments");

    let balance = Balance::compute(&document, &timew.window, &timew.intervals)
        .with_context(|| format!("cannot balance allotments in {}", path.display()))?;

    let format = if options.json {
        OutputFormat::Json
    } else {
        config.format
    };
    match format {
        OutputFormat::Table => Ok(crate::render::format_report(&balance, &timew.window)),
        OutputFormat::Json => {
            let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
            crate::render::format_json(&balance, &timew.window, &timezone)
        }
    }
}

/// Picks the allotment file: command line, then configuration, then
/// `balance.conf` in the Timewarrior data directory.
fn allotments_path(options: &ReportOptions, config: &Config, timew: &TimewInput) -> Result<PathBuf> {
    if let Some(path) = options
        .allotments
        .as_deref()
        .or(config.allotments_path.as_deref())
    {
        return Ok(path.to_path_buf());
    }
    match timew.data_dir() {
        Some(dir) => Ok(dir.join(ALLOTMENTS_FILE)),
        None => bail!("cannot locate {ALLOTMENTS_FILE}: Timewarrior did not report temp.db"),
    }
}
