//! # kql-sqlgen
//!
//! Lowers an optimized KQL query tree into a single parameterized SQL
//! statement against a PostgreSQL-style backend, using positional
//! placeholders (`$1, $2, ...`). The tenant identifier is always bound
//! to `$1` and appears in the outermost `WHERE` clause -- every query
//! this generator produces is tenant-scoped, with no code path that
//! can omit it.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

mod error;
mod expr;
mod operation;
mod quoting;

pub use self::error::GenerationError;

use kql_ast::Query;
use operation::apply_operation;
use quoting::quote_ident;

/// The result of SQL generation: a single statement plus its bound
/// parameters in placeholder order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SqlOutput {
    /// The generated SQL statement, using `$1, $2, ...` placeholders.
    pub sql: String,
    /// Bound parameter values, in placeholder order. `params[0]` is
    /// always the tenant identifier.
    pub params: Vec<String>,
}

/// Counts occurrences of a `$`-prefixed positional placeholder in `sql`.
/// Used only to cross-check the parameter-count invariant below.
fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut chars = sql.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if ch == '$' && chars.peek().is_some_and(|(_, c)| c.is_ascii_digit()) {
            count += 1;
        }
    }
    count
}

/// Lowers `query` to a parameterized statement scoped to `tenant_id`.
///
/// The tenant identifier is bound as `$1` before any operation is
/// translated, so every emitted statement is tenant-scoped by
/// construction. Fails only for a join kind with no safe SQL
/// translation (`leftanti`/`rightsemi`) or a malformed array operand,
/// both of which indicate either an unsupported feature or a bug
/// upstream rather than a well-formed user query.
pub fn generate_sql(query: &Query, tenant_id: &str) -> Result<SqlOutput, GenerationError> {
    let mut params = Vec::new();
    params.push(tenant_id.into());

    let mut sql = format!(
        "(SELECT * FROM {} WHERE organization_id = $1)",
        quote_ident(&query.table.name)
    );
    for op in &query.operations {
        sql = apply_operation(op, sql, &mut params)?;
    }

    assert_eq!(
        params.first().map(String::as_str),
        Some(tenant_id),
        "tenant identifier must remain bound to the first parameter"
    );
    assert_eq!(
        params.len(),
        count_placeholders(&sql),
        "parameter count must equal the number of emitted placeholders"
    );

    Ok(SqlOutput { sql, params })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_ast::{BinaryExpr, BinaryOperator, Expr, IdentifierExpr, Literal, LiteralValue, Operation, TableExpression, WhereOp};
    use kql_common::Span;

    #[test]
    fn base_query_binds_tenant_id_as_the_first_placeholder() {
        let query = Query {
            table: TableExpression { name: "logs".into(), alias: None, span: Span::at(0) },
            operations: Vec::new(),
            span: Span::at(0),
        };
        let output = generate_sql(&query, "tenant-42").unwrap();
        assert_eq!(output.params[0], "tenant-42");
        assert!(output.sql.contains("WHERE organization_id = $1"));
    }

    #[test]
    fn where_clause_adds_a_second_placeholder() {
        let predicate = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Eq,
            left: Box::new(Expr::Identifier(IdentifierExpr { name: "severity".into(), span: Span::at(0) })),
            right: Box::new(Expr::Literal(Literal { value: LiteralValue::String("high".into()), span: Span::at(0) })),
            span: Span::at(0),
        });
        let query = Query {
            table: TableExpression { name: "logs".into(), alias: None, span: Span::at(0) },
            operations: vec![Operation::Where(WhereOp { predicate, span: Span::at(0) })],
            span: Span::at(0),
        };
        let output = generate_sql(&query, "tenant-1").unwrap();
        assert_eq!(output.params.len(), 2);
        assert_eq!(output.params[1], "high");
    }
}
