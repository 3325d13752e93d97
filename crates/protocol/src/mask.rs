//! inotify mask bits.
//!
//! Values match `<sys/inotify.h>` so masks read off the wire can be
//! interpreted directly.

use bitflags::bitflags;

bitflags! {
    /// Bits carried in the `mask` field of an inotify record, and the
    /// subset accepted by `inotify_add_watch`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        /// File was accessed (e.g., read).
        const IN_ACCESS = 0x0000_0001;
        /// File was modified.
        const IN_MODIFY = 0x0000_0002;
        /// Metadata changed.
        const IN_ATTRIB = 0x0000_0004;
        /// Writable file was closed.
        const IN_CLOSE_WRITE = 0x0000_0008;
        /// Unwritable file was closed.
        const IN_CLOSE_NOWRITE = 0x0000_0010;
        /// File was opened.
        const IN_OPEN = 0x0000_0020;
        /// Entry moved out of the watched directory.
        const IN_MOVED_FROM = 0x0000_0040;
        /// Entry moved into the watched directory.
        const IN_MOVED_TO = 0x0000_0080;
        /// Entry created in the watched directory.
        const IN_CREATE = 0x0000_0100;
        /// Entry deleted from the watched directory.
        const IN_DELETE = 0x0000_0200;
        /// Watched directory itself was deleted.
        const IN_DELETE_SELF = 0x0000_0400;
        /// Watched directory itself was moved.
        const IN_MOVE_SELF = 0x0000_0800;

        /// Either close flavour.
        const IN_CLOSE = Self::IN_CLOSE_WRITE.bits() | Self::IN_CLOSE_NOWRITE.bits();
        /// Either side of a rename.
        const IN_MOVE = Self::IN_MOVED_FROM.bits() | Self::IN_MOVED_TO.bits();

        // Set by the kernel on returned records.
        /// Backing filesystem was unmounted.
        const IN_UNMOUNT = 0x0000_2000;
        /// Kernel event queue overflowed; events were dropped.
        const IN_Q_OVERFLOW = 0x0000_4000;
        /// Watch was removed.
        const IN_IGNORED = 0x0000_8000;
        /// Subject of the record is a directory.
        const IN_ISDIR = 0x4000_0000;
    }
}

/// Activity kinds registered on every watched directory.
pub const WATCH_MASK: EventMask = EventMask::IN_ACCESS
    .union(EventMask::IN_CREATE)
    .union(EventMask::IN_DELETE)
    .union(EventMask::IN_MOVE)
    .union(EventMask::IN_OPEN)
    .union(EventMask::IN_CLOSE)
    .union(EventMask::IN_MODIFY);
