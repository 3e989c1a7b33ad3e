//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where expression nodes and errors occur in
//! SQL text.

use std::fmt;

/// A span of SQL text, represented by its starting byte offset.
///
/// Every expression node carries the offset of the token it was parsed
/// from, and every resolution failure reports the span of the node or
/// argument it concerns.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset into the SQL text (0-indexed).
    pub offset: u32,
    /// Length in bytes (for additional context).
    pub len: u32,
}

impl Span {
    /// Create a new span from an offset and length.
    #[inline]
    pub fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Create a zero-length span at an offset.
    #[inline]
    pub fn point(offset: u32) -> Self {
        Self { offset, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Merge two spans into the smallest span covering both.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let start = self.offset.min(other.offset);
        let end = (self.offset + self.len).max(other.offset + other.len);
        Span {
            offset: start,
            len: end - start,
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.offset, self.offset + self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.offset)
    }
}
