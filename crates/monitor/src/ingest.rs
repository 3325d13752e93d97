//! The ingestion loop: wait for a batch, log every record in it, grow the
//! buffer if the batch came close to filling it, repeat until stopped.

use crate::buffer::ReceiveBuffer;
use crate::error::WatchError;
use crate::parser::{FrameParser, Outcome, OverflowLine};
use crate::registry::Registry;
use crate::shutdown::StopSignal;
use crate::source::EventSource;
use crate::stats::RunStats;
use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Result of one wait.
#[derive(Debug, PartialEq, Eq)]
enum Wait {
    /// `n > 0` bytes of records were read.
    Batch(usize),
    /// Nothing was read; a chance to flush output.
    WakeUp,
    /// A stop was requested.
    Stop,
}

/// Owns the source and receive buffer for one run.
pub struct Ingestor<'r, S> {
    source: S,
    parser: FrameParser<'r>,
    buffer: ReceiveBuffer,
    stats: RunStats,
}

impl<'r, S: EventSource> Ingestor<'r, S> {
    /// Start a run. Statistics count from here.
    pub fn new(source: S, registry: &'r Registry, buffer: ReceiveBuffer) -> Self {
        Self {
            source,
            parser: FrameParser::new(registry),
            buffer,
            stats: RunStats::start(),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn buffer(&self) -> &ReceiveBuffer {
        &self.buffer
    }

    /// Log events to `out` until `stop` fires or a fatal error occurs.
    ///
    /// `out` is flushed every `flush_every` while idle, and before returning.
    pub async fn run<W: Write>(
        &mut self,
        out: &mut W,
        stop: &mut StopSignal,
        flush_every: Duration,
    ) -> Result<(), WatchError> {
        let mut ticker = flush_ticker(flush_every);

        tracing::info!(
            capacity = self.buffer.capacity(),
            max_capacity = self.buffer.max_capacity(),
            "Waiting for events"
        );

        let result = loop {
            if stop.is_requested() {
                break Ok(());
            }

            let wait = wait_for_batch(
                &mut self.source,
                self.buffer.as_mut_slice(),
                stop,
                &mut ticker,
            )
            .await;

            match wait {
                Ok(Wait::Batch(read)) => {
                    if let Err(e) = self.ingest(read, Utc::now(), out) {
                        break Err(e);
                    }
                }
                Ok(Wait::WakeUp) => {
                    if let Err(e) = out.flush() {
                        break Err(WatchError::Output(e));
                    }
                }
                Ok(Wait::Stop) => break Ok(()),
                Err(e) => break Err(WatchError::Read(e)),
            }
        };

        tracing::info!("Ingestion stopped");
        let flushed = out.flush().map_err(WatchError::Output);
        result.and(flushed)
    }

    /// Log the `read` bytes at the front of the buffer, then apply the
    /// growth policy.
    fn ingest<W: Write>(
        &mut self,
        read: usize,
        timestamp: DateTime<Utc>,
        out: &mut W,
    ) -> Result<(), WatchError> {
        let batch = self.buffer.filled(read);
        let mut outcomes = self.parser.parse(batch, timestamp);

        for outcome in outcomes.by_ref() {
            match outcome? {
                Outcome::Event(event) => {
                    writeln!(out, "{event}").map_err(WatchError::Output)?;
                    self.stats.events += 1;
                }
                Outcome::Overflow { timestamp } => {
                    writeln!(out, "{}", OverflowLine(timestamp)).map_err(WatchError::Output)?;
                    self.stats.overflows += 1;
                    tracing::warn!("inotify event queue overflowed; events were lost");
                }
                Outcome::Unknown { wd, mask } => {
                    tracing::debug!(wd = wd, mask = ?mask, "Skipping record for unknown watch");
                }
            }
        }
        outcomes.finish()?;
        tracing::trace!(bytes = outcomes.consumed(), "Batch parsed");

        if self.buffer.record_read(read) {
            self.stats.buffer_resizes += 1;
            tracing::info!(
                read = read,
                capacity = self.buffer.capacity(),
                threshold = self.buffer.resize_threshold(),
                "Grew receive buffer"
            );
        }

        Ok(())
    }

    /// End the run and hand back its statistics.
    pub fn finish(mut self) -> RunStats {
        self.stats.finish();
        self.stats
    }
}

fn flush_ticker(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Block until a batch arrives, the flush timer fires, or a stop is
/// requested.
async fn wait_for_batch<S: EventSource>(
    source: &mut S,
    buf: &mut [u8],
    stop: &mut StopSignal,
    ticker: &mut Interval,
) -> io::Result<Wait> {
    tokio::select! {
        biased;

        _ = stop.requested() => Ok(Wait::Stop),
        read = source.read_batch(buf) => match read {
            Ok(0) => {
                tracing::warn!("inotify read returned no data");
                Ok(Wait::WakeUp)
            }
            Ok(n) => Ok(Wait::Batch(n)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Wait::WakeUp),
            Err(e) => Err(e),
        },
        _ = ticker.tick() => Ok(Wait::WakeUp),
    }
}
