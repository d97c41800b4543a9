#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec::Vec};
use core::fmt;

use kql_lexer::LexError;
use kql_parser::ParseError;
use kql_sqlgen::GenerationError;

/// The façade-level error chaining every lower layer's failure mode:
/// lexing, parsing, SQL generation, and (only for [`crate::Engine::execute_query`])
/// the backend itself.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineError {
    /// One or more non-fatal lexical errors collected while tokenizing.
    Lex(Vec<LexError>),
    /// A syntax error aborted the parse.
    Parse(ParseError),
    /// SQL generation refused to lower the optimized tree.
    Generate(GenerationError),
    /// The backend rejected or failed a query. Carries the original
    /// backend message verbatim, prefixed per the propagation rule.
    Execution(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Lex(errors) => {
                write!(f, "{} lexical error(s)", errors.len())?;
                if let Some(first) = errors.first() {
                    write!(f, ": {}", first)?;
                }
                Ok(())
            }
            EngineError::Parse(err) => write!(f, "{}", err),
            EngineError::Generate(err) => write!(f, "{}", err),
            EngineError::Execution(msg) => write!(f, "Query execution failed: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::Parse(err)
    }
}

impl From<GenerationError> for EngineError {
    fn from(err: GenerationError) -> Self {
        EngineError::Generate(err)
    }
}

impl EngineError {
    /// Wraps a backend error's message with the `"Query execution
    /// failed"` prefix the propagation rule requires.
    pub fn execution(message: impl Into<String>) -> Self {
        EngineError::Execution(message.into())
    }
}
