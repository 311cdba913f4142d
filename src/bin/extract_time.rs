//! extract-time - pull a date/time out of free text from the command line
//!
//! Each TEXT argument (or each stdin line when none is given) is extracted
//! independently. Exit code 0 when every input produced a value, 1 when any
//! did not, 2 on configuration or I/O errors.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use auto_extract_time::config::default_config_path;
use auto_extract_time::{
    init_tracing, Clock, ConfigError, ExtractionResult, ExtractorConfig, FixedClock, TimeExtractor,
};
use chrono::NaiveDateTime;
use clap::Parser;
use thiserror::Error;

/// Extract clock times, dates and relative days from text
#[derive(Parser)]
#[command(name = "extract-time")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Text to scan. Reads stdin line by line when omitted.
    text: Vec<String>,

    /// Print one JSON object per input instead of the rendered value
    #[arg(long)]
    json: bool,

    /// Accept only values within this many days from now (negative looks back)
    #[arg(long, allow_hyphen_values = true)]
    days: Option<i64>,

    /// Config file (default: the per-user config, if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pin the reference time, e.g. "2026-02-20 09:30:00"
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_now(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM:SS\": {e}"))
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "extract-time failed");
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn load_config(cli: &Cli) -> Result<ExtractorConfig, ConfigError> {
    let config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::load_or_default(&default_config_path())?,
    };
    Ok(match cli.days {
        Some(days) => config.with_day_range(days),
        None => config,
    })
}

fn run(cli: &Cli) -> Result<bool, CliError> {
    let config = load_config(cli)?;
    tracing::info!(inputs = cli.text.len(), pinned = cli.now.is_some(), "extract-time starting");

    match cli.now {
        Some(now) => run_with(&TimeExtractor::with_clock(&config, FixedClock(now))?, cli),
        None => run_with(&TimeExtractor::new(&config)?, cli),
    }
}

fn run_with<C: Clock>(extractor: &TimeExtractor<C>, cli: &Cli) -> Result<bool, CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut all_ok = true;

    if cli.text.is_empty() {
        for line in io::stdin().lock().lines() {
            let result = extractor.start(&line?);
            all_ok &= result.is_successful();
            emit(&mut out, &result, cli.json)?;
        }
    } else {
        for text in &cli.text {
            let result = extractor.start(text);
            all_ok &= result.is_successful();
            emit(&mut out, &result, cli.json)?;
        }
    }

    Ok(all_ok)
}

fn emit(out: &mut impl Write, result: &ExtractionResult, json: bool) -> Result<(), CliError> {
    if json {
        writeln!(out, "{}", serde_json::to_string(result)?)?;
    } else if result.is_successful() {
        writeln!(out, "{}", result.format())?;
    } else if let Some(reason) = result.error_reason() {
        writeln!(out, "! {reason}")?;
    }
    Ok(())
}
