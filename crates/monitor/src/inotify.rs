//! Kernel inotify instance driven through tokio's reactor.

use crate::source::{EventSource, WatchDescriptor};
use dirwatch_protocol::EventMask;
use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tokio::io::unix::AsyncFd;

/// An inotify file descriptor.
///
/// The descriptor is non-blocking and registered with the runtime, so a
/// pending read can be raced against the stop signal and the flush timer.
/// Dropping it closes the descriptor, which releases every watch on it.
#[derive(Debug)]
pub struct Inotify {
    fd: AsyncFd<OwnedFd>,
}

impl Inotify {
    /// Create a new instance. Must be called from within the tokio runtime.
    pub fn init() -> io::Result<Self> {
        // SAFETY: inotify_init1 takes no pointers; the flags are valid.
        let raw = unsafe { libc::inotify_init1(libc::IN_NONBLOCK | libc::IN_CLOEXEC) };
        if raw == -1 {
            return Err(io::Error::last_os_error());
        }

        // SAFETY: raw is a freshly created descriptor that nothing else owns.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };
        Ok(Self {
            fd: AsyncFd::new(fd)?,
        })
    }
}

impl EventSource for Inotify {
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchDescriptor> {
        let path = CString::new(path.as_os_str().as_bytes())?;

        // SAFETY: the descriptor is open and path is a valid NUL-terminated string.
        let wd =
            unsafe { libc::inotify_add_watch(self.fd.as_raw_fd(), path.as_ptr(), mask.bits()) };
        if wd == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(wd)
    }

    async fn read_batch(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let mut guard = self.fd.readable_mut().await?;

            let result = guard.try_io(|inner| {
                // SAFETY: buf is valid for writes of buf.len() bytes.
                let n = unsafe {
                    libc::read(
                        inner.get_ref().as_raw_fd(),
                        buf.as_mut_ptr().cast(),
                        buf.len(),
                    )
                };
                if n < 0 {
                    Err(io::Error::last_os_error())
                } else {
                    Ok(n as usize)
                }
            });

            match result {
                Ok(read) => return read,
                // Readiness was stale; wait again.
                Err(_would_block) => continue,
            }
        }
    }
}
