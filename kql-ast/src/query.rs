#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};
use core::fmt;

use kql_common::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{expr::Expr, operation::Operation, utils::display_comma_separated};

/// A table reference, optionally aliased: `name [alias]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableExpression {
    /// The table name.
    pub name: String,
    /// The optional alias bound to it.
    pub alias: Option<String>,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for TableExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " {}", alias)?;
        }
        Ok(())
    }
}

/// A `let name = expr` binding at the top of a program.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LetStmt {
    /// The bound name.
    pub name: String,
    /// The bound expression.
    pub expr: Expr,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for LetStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "let {} = {}", self.name, self.expr)
    }
}

/// `tableExpr ('|' operation)*`: exactly one source table followed by a
/// chain of post-pipe operations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Query {
    /// The source table.
    pub table: TableExpression,
    /// The pipeline of operations applied to it, in source order.
    pub operations: Vec<Operation>,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        for op in &self.operations {
            write!(f, " | {}", op)?;
        }
        Ok(())
    }
}

/// `(letStmt ';')* query`: the top-level parse result.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    /// Leading `let` bindings, in declaration order.
    pub lets: Vec<LetStmt>,
    /// The final query.
    pub query: Query,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for let_stmt in &self.lets {
            write!(f, "{}; ", let_stmt)?;
        }
        write!(f, "{}", self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_common::Span;

    #[test]
    fn query_display_round_trips_pipeline_text() {
        let query = Query {
            table: TableExpression {
                name: "logs".into(),
                alias: None,
                span: Span::new(0, 4),
            },
            operations: Vec::new(),
            span: Span::new(0, 4),
        };
        assert_eq!(query.to_string(), "logs");
    }
}
