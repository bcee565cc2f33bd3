//! Types related to source files.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::files::FileId;

/// Byte offsets into source files.
pub type BytePos = u32;

/// Byte ranges in source files.
///
/// These are carried by every syntax-tree and AST node so that diagnostics
/// can point back at the source. They survive the AST cache unchanged.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    file_id: FileId,
    start: BytePos,
    end: BytePos,
}

impl fmt::Debug for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ByteRange({}, {}..{})",
            self.file_id, self.start, self.end
        )
    }
}

impl ByteRange {
    pub const fn new(file_id: FileId, start: BytePos, end: BytePos) -> Self {
        Self {
            file_id,
            start,
            end,
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub const fn start(&self) -> BytePos {
        self.start
    }

    pub const fn end(&self) -> BytePos {
        self.end
    }

    /// Merge two ranges in the same file into one covering both.
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(
            self.file_id,
            self.start.min(other.start),
            self.end.max(other.end),
        )
    }
}

impl From<ByteRange> for Range<usize> {
    fn from(range: ByteRange) -> Self {
        (range.start as usize)..(range.end as usize)
    }
}
