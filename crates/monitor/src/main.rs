//! dirwatch
//!
//! Watches a set of directories with inotify and prints one timestamped line
//! per filesystem event, growing its read buffer under bursts and counting
//! kernel queue overflows.

mod buffer;
mod cli;
mod config;
mod error;
mod ingest;
mod inotify;
mod legend;
mod parser;
mod registry;
mod shutdown;
mod source;
mod stats;

use buffer::ReceiveBuffer;
use clap::Parser;
use cli::Cli;
use color_eyre::eyre::Result;
use config::Config;
use error::WatchError;
use ingest::Ingestor;
use inotify::Inotify;
use registry::Registry;
use std::io::{BufWriter, Write};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref())?
        .with_log_level(cli.log_level.clone())
        .with_flush_interval(cli.flush_interval)
        .with_events_per_watch(cli.events_per_watch);

    init_logging(&config.monitor.log_level)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        directories = cli.directories.len(),
        "Starting dirwatch"
    );

    let mut inotify = Inotify::init().map_err(WatchError::Init)?;
    let registry = Registry::build(&mut inotify, &cli.directories)?;
    let buffer = ReceiveBuffer::new(registry.len(), config.monitor.events_per_watch());
    let mut stop = shutdown::install().map_err(WatchError::Signal)?;

    // Block buffered; the ingestion loop flushes on its timer and at exit.
    let mut out = BufWriter::new(std::io::stdout().lock());
    if !cli.no_legend {
        legend::write_legend(&mut out)?;
    }
    writeln!(out, "Waiting for events...")?;
    out.flush()?;

    let mut ingestor = Ingestor::new(inotify, &registry, buffer);
    let result = ingestor
        .run(&mut out, &mut stop, config.monitor.flush_interval())
        .await;

    tracing::debug!(
        capacity = ingestor.buffer().capacity(),
        events = ingestor.stats().events,
        "Run complete"
    );
    let stats = ingestor.finish();
    write!(out, "{stats}")?;
    out.flush()?;

    result?;
    tracing::info!(
        started = %stats.started(),
        finished = ?stats.finished(),
        "dirwatch stopped"
    );
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    // stdout carries the event log; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
