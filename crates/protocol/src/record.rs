//! Binary layout of inotify records and a bounds-checked walker over a batch.
//!
//! A single `read(2)` on an inotify descriptor returns zero or more records
//! laid end to end:
//!
//! ```text
//! +--------+--------+--------+--------+----------------------+
//! | wd i32 | mask   | cookie | len    | name: [u8; len]      |
//! |        | u32    | u32    | u32    | NUL padded           |
//! +--------+--------+--------+--------+----------------------+
//! ```
//!
//! Fields are in native byte order. The kernel never splits a record across
//! two reads, so a batch that does not end exactly on a record boundary is
//! corrupt.

use crate::mask::EventMask;
use thiserror::Error;

/// Watch descriptor the kernel reports on queue-overflow records.
pub const OVERFLOW_WD: i32 = -1;

/// Longest file name component on Linux, excluding the NUL terminator.
pub const NAME_MAX: usize = 255;

/// Largest possible single record: header, longest name, terminator.
pub const MAX_EVENT_SIZE: usize = RecordHeader::HEADER_SIZE + NAME_MAX + 1;

/// Errors raised while walking a batch of records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// A header or name ran past the end of the batch.
    #[error("record at offset {offset} needs {needed} bytes but only {available} remain")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The walk finished without accounting for every byte of the batch.
    #[error("parsed {consumed} of {len} bytes in batch")]
    Incomplete { consumed: usize, len: usize },
}

/// Fixed-size header at the start of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Watch descriptor the record belongs to.
    pub wd: i32,
    /// Raw event mask.
    pub mask: u32,
    /// Correlates the two halves of a rename.
    pub cookie: u32,
    /// Length of the name field that follows, padding included.
    pub len: u32,
}

impl RecordHeader {
    /// Size of the fixed header (`sizeof(struct inotify_event)`).
    pub const HEADER_SIZE: usize = 16;

    /// Decode a header from the first [`Self::HEADER_SIZE`] bytes of `buf`.
    ///
    /// Returns `None` if the buffer is too small.
    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        let header = buf.get(..Self::HEADER_SIZE)?;
        let word = |at: usize| -> Option<[u8; 4]> { header[at..at + 4].try_into().ok() };

        Some(Self {
            wd: i32::from_ne_bytes(word(0)?),
            mask: u32::from_ne_bytes(word(4)?),
            cookie: u32::from_ne_bytes(word(8)?),
            len: u32::from_ne_bytes(word(12)?),
        })
    }

    /// Encode this header in native byte order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::HEADER_SIZE] {
        let mut buf = [0u8; Self::HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.wd.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.mask.to_ne_bytes());
        buf[8..12].copy_from_slice(&self.cookie.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.len.to_ne_bytes());
        buf
    }
}

/// Encode a complete record the way the kernel lays it out.
///
/// An empty `name` produces a header-only record (`len == 0`), as the kernel
/// does for events on the watched directory itself. Otherwise the name is
/// NUL terminated and padded to a 4-byte boundary.
#[must_use]
pub fn encode_record(wd: i32, mask: EventMask, cookie: u32, name: &[u8]) -> Vec<u8> {
    let len = if name.is_empty() {
        0
    } else {
        (name.len() + 1 + 3) & !3
    };

    let header = RecordHeader {
        wd,
        mask: mask.bits(),
        cookie,
        len: len as u32,
    };

    let mut buf = Vec::with_capacity(RecordHeader::HEADER_SIZE + len);
    buf.extend_from_slice(&header.to_bytes());
    buf.extend_from_slice(name);
    buf.resize(RecordHeader::HEADER_SIZE + len, 0);
    buf
}

/// One record, borrowed from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub wd: i32,
    pub mask: EventMask,
    pub cookie: u32,
    /// The full `len`-byte name field, padding included.
    pub name: &'a [u8],
}

impl<'a> RawRecord<'a> {
    /// Bytes this record occupied in the batch.
    #[must_use]
    pub const fn size(&self) -> usize {
        RecordHeader::HEADER_SIZE + self.name.len()
    }

    /// Name bytes up to the first NUL. Empty when the record carries no name.
    #[must_use]
    pub fn name_bytes(&self) -> &'a [u8] {
        let name = self.name;
        match name.iter().position(|&b| b == 0) {
            Some(end) => &name[..end],
            None => name,
        }
    }

    /// Whether this is the kernel's queue-overflow notice.
    #[must_use]
    pub fn is_overflow(&self) -> bool {
        self.wd == OVERFLOW_WD && self.mask.contains(EventMask::IN_Q_OVERFLOW)
    }
}

/// Lazy walk over the records of one batch.
///
/// Yields each record in order. On a framing violation it yields a single
/// [`FrameError`] and then stops.
#[derive(Debug)]
pub struct Records<'a> {
    batch: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Records<'a> {
    #[must_use]
    pub const fn new(batch: &'a [u8]) -> Self {
        Self {
            batch,
            offset: 0,
            failed: false,
        }
    }

    /// Bytes walked so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.offset
    }

    /// Check that the walk covered the whole batch.
    pub fn finish(&self) -> Result<(), FrameError> {
        if self.failed || self.offset != self.batch.len() {
            return Err(FrameError::Incomplete {
                consumed: self.offset,
                len: self.batch.len(),
            });
        }
        Ok(())
    }

    fn truncated(&mut self, needed: usize) -> FrameError {
        self.failed = true;
        FrameError::Truncated {
            offset: self.offset,
            needed,
            available: self.batch.len() - self.offset,
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<RawRecord<'a>, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.batch.len() {
            return None;
        }

        let batch = self.batch;
        let rest = &batch[self.offset..];
        let Some(header) = RecordHeader::from_bytes(rest) else {
            return Some(Err(self.truncated(RecordHeader::HEADER_SIZE)));
        };

        let size = RecordHeader::HEADER_SIZE + header.len as usize;
        let Some(name) = rest.get(RecordHeader::HEADER_SIZE..size) else {
            return Some(Err(self.truncated(size)));
        };

        self.offset += size;
        Some(Ok(RawRecord {
            wd: header.wd,
            mask: EventMask::from_bits_truncate(header.mask),
            cookie: header.cookie,
            name,
        }))
    }
}

impl std::iter::FusedIterator for Records<'_> {}
