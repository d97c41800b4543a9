#[cfg(not(feature = "std"))]
use alloc::string::String;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A non-fatal lexical error. The lexer never aborts on these: it emits
/// an [`crate::TokenKind::Invalid`] token and continues scanning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LexError {
    /// Human-readable description of the problem.
    pub message: String,
    /// Byte offset at which the problem was found.
    pub position: u32,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LexError {}
