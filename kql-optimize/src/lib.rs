//! # kql-optimize
//!
//! A small rule-based optimizer over the typed query tree from
//! `kql-ast`, plus the deterministic cost model used to build an
//! [`ExecutionPlan`]. Rules run in a fixed order -- predicate
//! combination, projection placement, constant folding, dead-code
//! elimination, cost-ordered reordering -- each appending an
//! [`OptimizationApplied`] descriptor to the plan regardless of whether
//! it actually changed anything.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

mod fold;
mod rules;

pub use self::fold::fold_expr;
pub use self::rules::{
    build_execution_plan, constant_folding, cost_ordered_reordering, dead_code_elimination,
    predicate_combination, projection_placement,
};

use kql_ast::Query;
use kql_common::ExecutionPlan;

/// Runs every optimization rule over `query`'s operation pipeline in
/// order, then builds the execution plan from the result. Returns the
/// (possibly rewritten) query alongside the plan, whose `optimizations`
/// field records what each rule did.
pub fn optimize(query: Query) -> (Query, ExecutionPlan) {
    let Query { table, operations, span } = query;

    let mut optimizations = Vec::new();

    let (operations, applied) = predicate_combination(operations);
    optimizations.extend(applied);

    let (operations, applied) = projection_placement(operations);
    optimizations.extend(applied);

    let (operations, applied) = constant_folding(operations);
    optimizations.extend(applied);

    let (operations, applied) = dead_code_elimination(operations);
    optimizations.push(applied);

    let (operations, applied) = cost_ordered_reordering(operations);
    optimizations.push(applied);

    let mut plan = build_execution_plan(&operations);
    plan.optimizations = optimizations;

    (Query { table, operations, span }, plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_ast::{BinaryExpr, BinaryOperator, Expr, IdentifierExpr, Literal, LiteralValue, TableExpression, WhereOp};
    use kql_common::Span;

    fn ident(name: &str) -> Expr {
        Expr::Identifier(IdentifierExpr { name: name.into(), span: Span::at(0) })
    }

    fn num(n: &str) -> Expr {
        Expr::Literal(Literal { value: LiteralValue::Number(n.into()), span: Span::at(0) })
    }

    #[test]
    fn two_where_clauses_combine_and_plan_has_a_table_scan_first() {
        let query = Query {
            table: TableExpression { name: "logs".into(), alias: None, span: Span::at(0) },
            operations: vec![
                kql_ast::Operation::Where(WhereOp { predicate: ident("a"), span: Span::at(0) }),
                kql_ast::Operation::Where(WhereOp { predicate: ident("b"), span: Span::at(0) }),
            ],
            span: Span::at(0),
        };
        let (optimized, plan) = optimize(query);
        assert_eq!(optimized.operations.len(), 1);
        assert!(matches!(&optimized.operations[0], kql_ast::Operation::Where(_)));
        assert_eq!(plan.steps[0].op_name, "TableScan");
        assert!(plan.optimizations.iter().any(|o| o.kind == "predicate_combination"));
        assert!(plan.optimizations.iter().any(|o| o.kind == "dead_code_elimination" && !o.applied));
    }

    #[test]
    fn constant_folding_runs_as_part_of_the_full_pipeline() {
        let predicate = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Gt,
            left: Box::new(num("5")),
            right: Box::new(num("3")),
            span: Span::at(0),
        });
        let query = Query {
            table: TableExpression { name: "logs".into(), alias: None, span: Span::at(0) },
            operations: vec![kql_ast::Operation::Where(WhereOp { predicate, span: Span::at(0) })],
            span: Span::at(0),
        };
        let (optimized, _plan) = optimize(query);
        match &optimized.operations[0] {
            kql_ast::Operation::Where(w) => {
                assert!(matches!(w.predicate, Expr::Literal(Literal { value: LiteralValue::Boolean(true), .. })));
            }
            _ => panic!("expected where"),
        }
    }
}
