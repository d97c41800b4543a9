#[cfg(not(feature = "std"))]
use alloc::string::String;
use core::fmt;

use kql_ast::JoinKind;

/// An error raised while lowering an optimized AST to parameterized SQL.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GenerationError {
    /// `leftanti`/`rightsemi` joins have no correct SQL `JOIN` rendering
    /// (downgrading to `LEFT`/`RIGHT` silently changes result semantics);
    /// generation refuses rather than emit a wrong query. A correct
    /// rewrite via `NOT EXISTS`/`EXISTS` is not implemented.
    UnsupportedJoinKind(JoinKind),
    /// An `Expr::Array` appeared somewhere other than the right-hand side
    /// of `in`/`!in`/`between`, or with the wrong element count for
    /// `between`. Indicates a malformed AST, not a user-facing condition.
    MalformedArrayOperand(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::UnsupportedJoinKind(kind) => {
                write!(f, "join kind '{}' has no safe SQL translation", kind)
            }
            GenerationError::MalformedArrayOperand(msg) => {
                write!(f, "malformed array operand: {}", msg)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GenerationError {}
