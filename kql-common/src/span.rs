#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A half-open byte-offset range `[start, end)` into the original source
/// text, carried by every token and AST node for diagnostics and
/// completion.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    /// Byte offset of the first byte covered by this span.
    pub start: u32,
    /// Byte offset one past the last byte covered by this span.
    pub end: u32,
}

impl Span {
    /// Creates a new span. Panics if `end < start` -- that is an invariant
    /// violation in the producer, not a user error.
    pub fn new(start: u32, end: u32) -> Self {
        assert!(end >= start, "span end must not precede start");
        Self { start, end }
    }

    /// Returns a zero-width span at the given offset.
    pub fn at(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The number of bytes covered by this span.
    pub fn len(self) -> u32 {
        self.end - self.start
    }

    /// Whether this span covers zero bytes.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}
