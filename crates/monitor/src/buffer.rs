//! Receive buffer for inotify reads.
//!
//! The buffer starts with room for one maximal record per watch and doubles
//! whenever a read comes back within one maximal record of full, up to a cap
//! of `events_per_watch` maximal records per watch. It never shrinks.

use dirwatch_protocol::MAX_EVENT_SIZE;

/// Default cap on buffered records per watch.
pub const DEFAULT_EVENTS_PER_WATCH: usize = 128;

/// Threshold at which a read of a buffer of `capacity` bytes counts as
/// nearly full: at least one more maximal record might not have fit.
#[must_use]
pub const fn resize_threshold_for(capacity: usize) -> usize {
    capacity.saturating_sub(MAX_EVENT_SIZE)
}

/// Byte storage for one batch of records.
#[derive(Debug)]
pub struct ReceiveBuffer {
    bytes: Vec<u8>,
    resize_threshold: usize,
    max_capacity: usize,
}

impl ReceiveBuffer {
    /// Size the buffer for `watch_count` watches.
    pub fn new(watch_count: usize, events_per_watch: usize) -> Self {
        let watch_count = watch_count.max(1);
        let capacity = MAX_EVENT_SIZE * watch_count;
        let max_capacity = capacity.saturating_mul(events_per_watch.max(1));

        Self {
            bytes: vec![0u8; capacity],
            resize_threshold: resize_threshold_for(capacity),
            max_capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn resize_threshold(&self) -> usize {
        self.resize_threshold
    }

    pub fn can_grow(&self) -> bool {
        self.capacity() < self.max_capacity
    }

    /// Whole buffer, for reading into.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// The first `len` bytes, as filled by the last read.
    pub fn filled(&self, len: usize) -> &[u8] {
        &self.bytes[..len.min(self.bytes.len())]
    }

    /// Apply the growth policy after a read of `bytes_read` bytes.
    ///
    /// Returns `true` if the buffer was doubled.
    pub fn record_read(&mut self, bytes_read: usize) -> bool {
        if bytes_read < self.resize_threshold || !self.can_grow() {
            return false;
        }

        let capacity = self
            .capacity()
            .saturating_mul(2)
            .min(self.max_capacity);
        self.bytes.resize(capacity, 0);
        self.resize_threshold = resize_threshold_for(capacity);
        true
    }
}
