//! Command-line interface for dirwatch.

use clap::Parser;
use std::path::PathBuf;

/// dirwatch - log inotify activity in a set of directories
#[derive(Debug, Parser)]
#[command(name = "dirwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to watch
    #[arg(required = true, value_name = "DIRECTORY")]
    pub directories: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "DIRWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DIRWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Seconds between output flushes while idle
    #[arg(long, value_name = "SECS")]
    pub flush_interval: Option<u64>,

    /// Cap on receive buffer growth, in maximal records per watch
    #[arg(long, value_name = "N")]
    pub events_per_watch: Option<usize>,

    /// Don't print the event legend at startup
    #[arg(long)]
    pub no_legend: bool,
}
