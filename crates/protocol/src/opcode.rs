//! Compact operation codes for event masks.

use crate::mask::EventMask;
use std::fmt;

/// One recognised activity kind and how it is shown.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub flag: EventMask,
    pub letter: char,
    pub description: &'static str,
}

/// Recognised activity kinds, in the order their letters appear in a code.
pub const OPERATIONS: [Operation; 9] = [
    Operation {
        flag: EventMask::IN_ACCESS,
        letter: 'r',
        description: "Object was accessed",
    },
    Operation {
        flag: EventMask::IN_CLOSE_WRITE,
        letter: 'X',
        description: "Object opened for writing was closed",
    },
    Operation {
        flag: EventMask::IN_CLOSE_NOWRITE,
        letter: 'x',
        description: "Object not opened for writing was closed",
    },
    Operation {
        flag: EventMask::IN_CREATE,
        letter: 'c',
        description: "Object was created",
    },
    Operation {
        flag: EventMask::IN_DELETE,
        letter: 'd',
        description: "Object was deleted",
    },
    Operation {
        flag: EventMask::IN_MODIFY,
        letter: 'w',
        description: "Object was modified",
    },
    Operation {
        flag: EventMask::IN_MOVED_FROM,
        letter: '<',
        description: "Object was moved (original name)",
    },
    Operation {
        flag: EventMask::IN_MOVED_TO,
        letter: '>',
        description: "Object was moved (new name)",
    },
    Operation {
        flag: EventMask::IN_OPEN,
        letter: 'o',
        description: "Object was opened",
    },
];

/// The letters for every recognised flag in a mask, e.g. `"co"` for
/// create + open. Empty when no recognised flag is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationCode(String);

impl OperationCode {
    #[must_use]
    pub fn from_mask(mask: EventMask) -> Self {
        Self(
            OPERATIONS
                .iter()
                .filter(|op| mask.contains(op.flag))
                .map(|op| op.letter)
                .collect(),
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OperationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
