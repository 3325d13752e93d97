//! Run statistics.

use chrono::{DateTime, Utc};
use std::fmt;

/// Counters for one run, printed at shutdown.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub events: u64,
    pub overflows: u64,
    pub buffer_resizes: u32,
    started: DateTime<Utc>,
    finished: Option<DateTime<Utc>>,
}

impl RunStats {
    /// Start counting now.
    pub fn start() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(started: DateTime<Utc>) -> Self {
        Self {
            events: 0,
            overflows: 0,
            buffer_resizes: 0,
            started,
            finished: None,
        }
    }

    /// Stamp the end of the run.
    pub fn finish(&mut self) {
        self.finish_at(Utc::now());
    }

    pub fn finish_at(&mut self, finished: DateTime<Utc>) {
        self.finished = Some(finished);
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    pub fn finished(&self) -> Option<DateTime<Utc>> {
        self.finished
    }

    /// Run time as whole seconds and microseconds, up to now if the run has
    /// not finished.
    pub fn elapsed(&self) -> (i64, u32) {
        let end = self.finished.unwrap_or_else(Utc::now);

        let mut seconds = end.timestamp() - self.started.timestamp();
        let end_micros = i64::from(end.timestamp_subsec_micros());
        let start_micros = i64::from(self.started.timestamp_subsec_micros());
        let mut micros = end_micros - start_micros;
        if micros < 0 {
            micros += 1_000_000;
            seconds -= 1;
        }
        (seconds, micros as u32)
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (seconds, micros) = self.elapsed();
        writeln!(f, "Run time: {seconds}.{micros:06}s")?;
        writeln!(f, "Total events: {}", self.events)?;
        writeln!(f, "inotify queue overflows: {}", self.overflows)?;
        writeln!(f, "read() buffer resizes: {}", self.buffer_resizes)
    }
}
