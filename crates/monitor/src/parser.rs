//! Turns a batch of raw records into loggable outcomes.

use crate::registry::Registry;
use crate::source::WatchDescriptor;
use chrono::{DateTime, Utc};
use dirwatch_protocol::{EventMask, FrameError, OperationCode, Records};
use std::borrow::Cow;
use std::fmt;

/// Timestamp layout for log lines, e.g. `2024-05-01 12:00:00.000123`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A record on a known watch, ready to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent<'a> {
    pub timestamp: DateTime<Utc>,
    pub operations: OperationCode,
    pub directory: &'a str,
    pub name: Cow<'a, str>,
    pub wd: WatchDescriptor,
    pub cookie: u32,
}

impl fmt::Display for DecodedEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Event: {} (path: {}/{}, watch: {}, cookie: {})",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.operations,
            self.directory,
            self.name,
            self.wd,
            self.cookie
        )
    }
}

/// What one record turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// Activity in a watched directory.
    Event(DecodedEvent<'a>),
    /// The kernel dropped an unknown number of events.
    Overflow { timestamp: DateTime<Utc> },
    /// A record for a watch this run does not know about. Not logged as an
    /// event.
    Unknown { wd: WatchDescriptor, mask: EventMask },
}

/// Log line for an overflow notice.
pub struct OverflowLine(pub DateTime<Utc>);

impl fmt::Display for OverflowLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Erp! inotify event queue overflow",
            self.0.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Decodes batches against a registry.
#[derive(Debug, Clone, Copy)]
pub struct FrameParser<'r> {
    registry: &'r Registry,
}

impl<'r> FrameParser<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Walk `batch`, stamping every outcome with `timestamp`.
    pub fn parse<'a>(&self, batch: &'a [u8], timestamp: DateTime<Utc>) -> Outcomes<'a>
    where
        'r: 'a,
    {
        Outcomes {
            registry: self.registry,
            records: Records::new(batch),
            timestamp,
        }
    }
}

/// Lazy sequence of outcomes for one batch.
///
/// Call [`Outcomes::finish`] after draining it to confirm the batch was
/// consumed exactly.
#[derive(Debug)]
pub struct Outcomes<'a> {
    registry: &'a Registry,
    records: Records<'a>,
    timestamp: DateTime<Utc>,
}

impl<'a> Outcomes<'a> {
    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.records.consumed()
    }

    pub fn finish(&self) -> Result<(), FrameError> {
        self.records.finish()
    }
}

impl<'a> Iterator for Outcomes<'a> {
    type Item = Result<Outcome<'a>, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };

        let registry = self.registry;
        let Some(directory) = registry.lookup(record.wd) else {
            if record.is_overflow() {
                return Some(Ok(Outcome::Overflow {
                    timestamp: self.timestamp,
                }));
            }
            return Some(Ok(Outcome::Unknown {
                wd: record.wd,
                mask: record.mask,
            }));
        };

        Some(Ok(Outcome::Event(DecodedEvent {
            timestamp: self.timestamp,
            operations: OperationCode::from_mask(record.mask),
            directory,
            name: String::from_utf8_lossy(record.name_bytes()),
            wd: record.wd,
            cookie: record.cookie,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::scripted::ScriptedSource;
    use chrono::TimeZone;
    use dirwatch_protocol::{OVERFLOW_WD, RecordHeader, encode_record};
    use std::path::PathBuf;

    fn registry(dirs: &[&str]) -> Registry {
        let mut source = ScriptedSource::new();
        let dirs: Vec<PathBuf> = dirs.iter().map(PathBuf::from).collect();
        Registry::build(&mut source, &dirs).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + chrono::Duration::microseconds(123)
    }

    fn collect<'a>(outcomes: &mut Outcomes<'a>) -> Vec<Outcome<'a>> {
        outcomes.by_ref().collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn test_one_outcome_per_record_in_order() {
        let registry = registry(&["/srv/a", "/srv/b/"]);
        let batch = [
            encode_record(1, EventMask::IN_CREATE | EventMask::IN_OPEN, 0, b"a.txt"),
            encode_record(2, EventMask::IN_MOVED_FROM, 9, b"old"),
            encode_record(2, EventMask::IN_MOVED_TO, 9, b"new"),
            encode_record(1, EventMask::IN_DELETE, 0, b"a.txt"),
        ]
        .concat();

        let mut outcomes = FrameParser::new(&registry).parse(&batch, now());
        let parsed = collect(&mut outcomes);

        assert_eq!(outcomes.consumed(), batch.len());
        assert!(outcomes.finish().is_ok());

        let codes: Vec<_> = parsed
            .iter()
            .map(|o| match o {
                Outcome::Event(e) => (e.operations.to_string(), e.name.to_string()),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            codes,
            vec![
                ("co".into(), "a.txt".into()),
                ("<".into(), "old".into()),
                (">".into(), "new".into()),
                ("d".into(), "a.txt".into()),
            ]
        );
    }

    #[test]
    fn test_event_fields() {
        let registry = registry(&["/srv/data/"]);
        let batch = encode_record(1, EventMask::IN_MOVED_TO, 77, b"report.pdf");

        let parsed = collect(&mut FrameParser::new(&registry).parse(&batch, now()));

        assert_eq!(
            parsed,
            vec![Outcome::Event(DecodedEvent {
                timestamp: now(),
                operations: OperationCode::from_mask(EventMask::IN_MOVED_TO),
                directory: "/srv/data",
                name: Cow::Borrowed("report.pdf"),
                wd: 1,
                cookie: 77,
            })]
        );
    }

    #[test]
    fn test_render_event_line() {
        let registry = registry(&["/srv/data"]);
        let batch = encode_record(1, EventMask::IN_CREATE | EventMask::IN_OPEN, 0, b"a.txt");

        let parsed = collect(&mut FrameParser::new(&registry).parse(&batch, now()));
        let Outcome::Event(event) = &parsed[0] else {
            panic!("expected event");
        };

        assert_eq!(
            event.to_string(),
            "2024-05-01 12:00:00.000123: Event: co (path: /srv/data/a.txt, watch: 1, cookie: 0)"
        );
    }

    #[test]
    fn test_event_on_directory_itself_has_empty_name() {
        let registry = registry(&["/srv/data"]);
        let batch = encode_record(1, EventMask::IN_OPEN | EventMask::IN_ISDIR, 0, b"");

        let parsed = collect(&mut FrameParser::new(&registry).parse(&batch, now()));
        let Outcome::Event(event) = &parsed[0] else {
            panic!("expected event");
        };
        assert_eq!(event.name, "");
        assert!(event.to_string().contains("(path: /srv/data/, watch: 1"));
    }

    #[test]
    fn test_no_recognised_flags_still_an_event() {
        let registry = registry(&["/srv/data"]);
        let batch = encode_record(1, EventMask::IN_ATTRIB, 0, b"f");

        let parsed = collect(&mut FrameParser::new(&registry).parse(&batch, now()));
        let Outcome::Event(event) = &parsed[0] else {
            panic!("expected event");
        };
        assert!(event.operations.is_empty());
        assert!(event.to_string().contains(": Event:  (path: /srv/data/f,"));
    }

    #[test]
    fn test_overflow_notice() {
        let registry = registry(&["/srv/data"]);
        let batch = [
            encode_record(OVERFLOW_WD, EventMask::IN_Q_OVERFLOW, 0, b""),
            encode_record(1, EventMask::IN_CREATE, 0, b"x"),
        ]
        .concat();

        let parsed = collect(&mut FrameParser::new(&registry).parse(&batch, now()));

        assert_eq!(parsed[0], Outcome::Overflow { timestamp: now() });
        assert!(matches!(parsed[1], Outcome::Event(_)));
        assert_eq!(
            OverflowLine(now()).to_string(),
            "2024-05-01 12:00:00.000123: Erp! inotify event queue overflow"
        );
    }

    #[test]
    fn test_unknown_handle_skipped_without_desync() {
        let registry = registry(&["/srv/data"]);
        let batch = [
            encode_record(42, EventMask::IN_CREATE, 0, b"some-long-name-for-padding"),
            encode_record(OVERFLOW_WD, EventMask::IN_CREATE, 0, b"y"),
            encode_record(1, EventMask::IN_DELETE, 0, b"z"),
        ]
        .concat();

        let mut outcomes = FrameParser::new(&registry).parse(&batch, now());
        let parsed = collect(&mut outcomes);

        assert_eq!(
            parsed[0],
            Outcome::Unknown {
                wd: 42,
                mask: EventMask::IN_CREATE
            }
        );
        assert!(matches!(parsed[1], Outcome::Unknown { wd: OVERFLOW_WD, .. }));
        let Outcome::Event(event) = &parsed[2] else {
            panic!("expected event");
        };
        assert_eq!(event.name, "z");
        assert!(outcomes.finish().is_ok());
    }

    #[test]
    fn test_corrupt_batch_fails() {
        let registry = registry(&["/srv/data"]);
        let mut batch = encode_record(1, EventMask::IN_CREATE, 0, b"a");
        let header = RecordHeader {
            wd: 1,
            mask: EventMask::IN_CREATE.bits(),
            cookie: 0,
            len: 300,
        };
        batch.extend_from_slice(&header.to_bytes());

        let mut outcomes = FrameParser::new(&registry).parse(&batch, now());
        assert!(matches!(outcomes.next(), Some(Ok(Outcome::Event(_)))));
        assert!(matches!(
            outcomes.next(),
            Some(Err(FrameError::Truncated { offset: 20, .. }))
        ));
        assert!(outcomes.next().is_none());
        assert!(outcomes.finish().is_err());
    }

    #[test]
    fn test_non_utf8_name_is_lossy() {
        let registry = registry(&["/srv/data"]);
        let batch = encode_record(1, EventMask::IN_CREATE, 0, b"caf\xe9");

        let parsed = collect(&mut FrameParser::new(&registry).parse(&batch, now()));
        let Outcome::Event(event) = &parsed[0] else {
            panic!("expected event");
        };
        assert_eq!(event.name, "caf\u{fffd}");
    }
}
