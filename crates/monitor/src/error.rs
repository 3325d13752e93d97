//! Error type for the monitor.

use dirwatch_protocol::FrameError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that end a run.
///
/// Queue overflows are not errors; they are counted and logged.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Creating the inotify instance failed.
    #[error("failed to initialise inotify: {0}")]
    Init(#[source] std::io::Error),

    /// Registering a directory watch failed.
    #[error("failed to watch {}: {source}", .path.display())]
    AddWatch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch did not split cleanly into records.
    #[error("corrupt event batch: {0}")]
    Frame(#[from] FrameError),

    /// Reading from the inotify instance failed.
    #[error("failed to read events: {0}")]
    Read(#[source] std::io::Error),

    /// Writing the event log failed.
    #[error("failed to write event log: {0}")]
    Output(#[source] std::io::Error),

    /// Installing the stop signal handlers failed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),
}
