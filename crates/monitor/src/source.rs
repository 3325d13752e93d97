//! The notification facility as seen by the registry and the ingestion loop.

use dirwatch_protocol::EventMask;
use std::io;
use std::path::Path;

/// Watch descriptor (matches the inotify wd type).
pub type WatchDescriptor = i32;

/// A source of raw inotify records.
///
/// [`crate::inotify::Inotify`] is the real implementation; tests drive the
/// loop with a scripted source instead.
pub trait EventSource {
    /// Register interest in `path` and return the handle records will carry.
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchDescriptor>;

    /// Wait until records are available and read at most `buf.len()` bytes
    /// of them.
    ///
    /// Must be cancel safe: dropping the future before it completes must not
    /// lose records.
    async fn read_batch(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
