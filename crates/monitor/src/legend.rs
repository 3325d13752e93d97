//! Startup legend for the operation letters.

use dirwatch_protocol::OPERATIONS;
use std::io::{self, Write};

pub fn write_legend<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Event descriptions:")?;
    for op in &OPERATIONS {
        writeln!(out, "Event {}: {}", op.letter, op.description)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_lists_every_letter() {
        let mut out = Vec::new();
        write_legend(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Event descriptions:\n"));
        assert_eq!(text.lines().count(), OPERATIONS.len() + 1);
        assert!(text.contains("Event c: Object was created\n"));
        assert!(text.contains("Event X: Object opened for writing was closed\n"));
    }
}
