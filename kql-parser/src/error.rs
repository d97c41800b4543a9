#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};
use core::fmt;

use kql_lexer::LexError;

/// Parser error: a lex-time problem surfaced through the parser, or a
/// syntactic problem found while parsing. Either aborts the current
/// production; the parser never attempts error recovery mid-grammar.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    /// A lexical error surfaced while tokenizing the source handed to the
    /// parser.
    Lex(String),
    /// An unexpected token, missing expected token, or invalid call
    /// target found while parsing.
    Syntax(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(s) => write!(f, "lex error: {}", s),
            ParseError::Syntax(s) => write!(f, "syntax error: {}", s),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err.to_string())
    }
}

impl From<String> for ParseError {
    fn from(message: String) -> Self {
        ParseError::Syntax(message)
    }
}

impl From<&str> for ParseError {
    fn from(message: &str) -> Self {
        ParseError::Syntax(message.into())
    }
}

/// A helper to construct a syntax error result.
pub(crate) fn syntax_error<R>(message: impl Into<String>) -> Result<R, ParseError> {
    Err(ParseError::Syntax(message.into()))
}
