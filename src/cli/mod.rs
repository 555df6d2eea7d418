//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use chrono::NaiveDateTime;
use clap::{command, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::dataset::DatasetFormat;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge last month's records into one dataset per station series
    Aggregate(AggregateArgs),
    /// Fetch current readings for every configured station
    Poll(PollArgs),
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Locations file [default: <config dir>/hydromet/locations.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory holding polled records
    #[arg(long, default_value = "data")]
    pub records: PathBuf,
    /// Directory receiving monthly datasets
    #[arg(long, default_value = "aggregated")]
    pub output: PathBuf,
    #[arg(long, value_enum, default_value_t = DatasetFormat::Csv)]
    pub format: DatasetFormat,
    /// Reference instant; the month before it is aggregated [default: now]
    #[arg(long, value_parser = command::parse_reference)]
    pub now: Option<NaiveDateTime>,
    /// Write a JSON list of produced datasets here
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Locations file [default: <config dir>/hydromet/locations.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory receiving polled records
    #[arg(long, default_value = "data")]
    pub records: PathBuf,
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let style = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    ProgressBar::new(size).with_message(message).with_style(style)
}

// -- Tests -------------------------------------------------------------------
