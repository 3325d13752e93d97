//! Watch registry: which directory each watch descriptor refers to.

use crate::error::WatchError;
use crate::source::{EventSource, WatchDescriptor};
use dirwatch_protocol::WATCH_MASK;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    /// Watch descriptor
    pub wd: WatchDescriptor,
    /// Directory as given, minus trailing separators
    pub path: String,
}

/// Watch descriptors of this run, built once at startup.
#[derive(Debug, Default)]
pub struct Registry {
    watches: HashMap<WatchDescriptor, WatchEntry>,
}

impl Registry {
    /// Watch every directory in `directories`.
    ///
    /// Fails on the first directory that cannot be watched. Watches already
    /// created stay on `source` and are released when it is closed.
    pub fn build<S: EventSource>(
        source: &mut S,
        directories: &[PathBuf],
    ) -> Result<Self, WatchError> {
        let mut watches: HashMap<WatchDescriptor, WatchEntry> =
            HashMap::with_capacity(directories.len());

        for dir in directories {
            let wd = source
                .add_watch(dir, WATCH_MASK)
                .map_err(|err| WatchError::AddWatch {
                    path: dir.clone(),
                    source: err,
                })?;

            let path = display_path(dir);
            if let Some(existing) = watches.get(&wd) {
                tracing::warn!(
                    wd = wd,
                    path = %path,
                    existing = %existing.path,
                    "Directory already watched"
                );
                continue;
            }

            tracing::info!(wd = wd, path = %path, "Watch added");
            watches.insert(wd, WatchEntry { wd, path });
        }

        Ok(Self { watches })
    }

    /// Directory for `wd`, or `None` for an unknown watch.
    pub fn lookup(&self, wd: WatchDescriptor) -> Option<&str> {
        self.watches.get(&wd).map(|entry| entry.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    /// Entries in descriptor order.
    #[cfg(test)]
    pub fn entries(&self) -> Vec<&WatchEntry> {
        let mut entries: Vec<_> = self.watches.values().collect();
        entries.sort_by_key(|entry| entry.wd);
        entries
    }
}

/// Path for display: trailing separators removed, `/` included.
fn display_path(dir: &Path) -> String {
    let lossy = dir.to_string_lossy();
    lossy.trim_end_matches('/').to_string()
}
