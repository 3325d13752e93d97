//! dirwatch protocol - the inotify record format and how records are read.
//!
//! This crate provides:
//! - [`EventMask`] bitflags matching the kernel's inotify mask values
//! - [`RecordHeader`] and [`encode_record`] for the binary record layout
//! - [`Records`], a bounds-checked walk over a batch returned by `read(2)`
//! - [`OperationCode`], the compact letter code used in the event log
//!
//! # Example
//!
//! ```rust
//! use dirwatch_protocol::{encode_record, EventMask, OperationCode, Records};
//!
//! let batch = encode_record(1, EventMask::IN_CREATE | EventMask::IN_OPEN, 0, b"a.txt");
//!
//! let mut records = Records::new(&batch);
//! let record = records.next().unwrap().unwrap();
//! assert_eq!(record.name_bytes(), b"a.txt");
//! assert_eq!(OperationCode::from_mask(record.mask).as_str(), "co");
//! assert!(records.finish().is_ok());
//! ```

mod mask;
mod opcode;
mod record;

pub use mask::{EventMask, WATCH_MASK};
pub use opcode::{OPERATIONS, Operation, OperationCode};
pub use record::{
    FrameError, MAX_EVENT_SIZE, NAME_MAX, OVERFLOW_WD, RawRecord, RecordHeader, Records,
    encode_record,
};
