//! Byte ranges addressing regions of the original source buffer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` in a source buffer.
///
/// Every node the engine may rewrite carries a span, and every edit is keyed
/// by one. Spans are absolute offsets into the buffer the provider parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a span, swapping the bounds if they arrive reversed.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Returns the number of bytes covered.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true for a zero-width span (an insertion point).
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns true when the two spans compete for the same text.
    ///
    /// Spans overlap when they share at least one byte. Adjacent spans do not
    /// overlap, but two spans starting at the same offset always do, so two
    /// insertions at one point cannot both be applied.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.start == other.start || (self.start < other.end && other.start < self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
