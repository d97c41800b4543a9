#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, string::{String, ToString}, vec, vec::Vec};
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeSet;
#[cfg(feature = "std")]
use std::collections::BTreeSet;

use kql_ast::{BinaryExpr, BinaryOperator, Expr, Operation};
use kql_common::{ExecutionPlan, OptimizationApplied, PlanStep};

use crate::fold::fold_expr;

/// Folds all `WhereOp`s in the pipeline into a single `and`-chained
/// predicate placed at the front of the remaining operations. No-op
/// (and unrecorded) when fewer than two `WhereOp`s are present.
pub fn predicate_combination(operations: Vec<Operation>) -> (Vec<Operation>, Option<OptimizationApplied>) {
    let where_count = operations.iter().filter(|op| matches!(op, Operation::Where(_))).count();
    if where_count < 2 {
        return (operations, None);
    }

    let mut combined: Option<Expr> = None;
    let mut rest = Vec::with_capacity(operations.len() - where_count + 1);
    for op in operations {
        match op {
            Operation::Where(where_op) => {
                combined = Some(match combined.take() {
                    None => where_op.predicate,
                    Some(acc) => {
                        let span = acc.span().cover(where_op.predicate.span());
                        Expr::Binary(BinaryExpr {
                            op: BinaryOperator::And,
                            left: Box::new(acc),
                            right: Box::new(where_op.predicate),
                            span,
                        })
                    }
                });
            }
            other => rest.push(other),
        }
    }

    let predicate = combined.expect("where_count >= 2 guarantees at least one WhereOp folded");
    let span = predicate.span();
    let mut new_operations = Vec::with_capacity(rest.len() + 1);
    new_operations.push(Operation::Where(kql_ast::WhereOp { predicate, span }));
    new_operations.extend(rest);

    let applied = OptimizationApplied {
        kind: "predicate_combination".into(),
        description: format!("combined {} where clauses into one", where_count),
        estimated_improvement: 0.1,
        applied: true,
    };
    (new_operations, Some(applied))
}

/// Returns the top-level expressions an operation reads column values
/// from, for the purposes of the projection-placement column-usage
/// analysis. An empty list means the operation is vacuously safe to move
/// a projection past (it reads no columns, e.g. `union`).
fn operation_exprs(op: &Operation) -> Vec<&Expr> {
    match op {
        Operation::Where(o) => vec![&o.predicate],
        Operation::Project(o) => o.columns.iter().map(|c| &c.expr).collect(),
        Operation::Extend(o) => o.assignments.iter().map(|a| &a.expr).collect(),
        Operation::Summarize(o) => {
            let mut exprs: Vec<&Expr> = o.aggregations.iter().filter_map(|a| a.expr.as_ref()).collect();
            if let Some(by) = &o.by {
                exprs.extend(by.iter());
            }
            exprs
        }
        Operation::Order(o) => o.order_by.iter().map(|s| &s.expr).collect(),
        Operation::Top(o) => {
            let mut exprs = vec![&o.count];
            if let Some(by) = &o.by {
                exprs.extend(by.iter().map(|s| &s.expr));
            }
            exprs
        }
        Operation::Limit(o) => vec![&o.count],
        Operation::Distinct(o) => o.columns.as_ref().map(|c| c.iter().collect()).unwrap_or_default(),
        Operation::Join(o) => vec![&o.on],
        Operation::Union(_) => Vec::new(),
    }
}

fn identifier_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Identifier(ident) => Some(ident.name.as_str()),
        _ => None,
    }
}

/// Moves the last `ProjectOp` to immediately after the leading `WhereOp`
/// run, if every operation in between references only columns within the
/// projection set and the projection itself only selects bare columns
/// (any computed/aliased column disqualifies the move).
pub fn projection_placement(
    mut operations: Vec<Operation>,
) -> (Vec<Operation>, Option<OptimizationApplied>) {
    let Some(project_idx) = operations.iter().rposition(|op| matches!(op, Operation::Project(_))) else {
        return (operations, None);
    };
    let Operation::Project(project) = &operations[project_idx] else {
        unreachable!("rposition matched Operation::Project");
    };
    if project
        .columns
        .iter()
        .any(|c| identifier_name(&c.expr).is_none() || c.alias.is_some())
    {
        return (operations, None);
    }
    let projected_names: BTreeSet<&str> = project
        .columns
        .iter()
        .map(|c| identifier_name(&c.expr).expect("checked above"))
        .collect();

    let insertion_point = operations
        .iter()
        .position(|op| !matches!(op, Operation::Where(_)))
        .unwrap_or(operations.len());

    if project_idx <= insertion_point {
        return (operations, None);
    }

    let qualifies = operations[insertion_point..project_idx].iter().all(|op| {
        let exprs = operation_exprs(op);
        exprs.iter().all(|e| {
            identifier_name(e)
                .map(|name| projected_names.contains(name))
                .unwrap_or(false)
        })
    });
    if !qualifies {
        return (operations, None);
    }

    let project = operations.remove(project_idx);
    operations.insert(insertion_point, project);
    let applied = OptimizationApplied {
        kind: "projection_placement".into(),
        description: "moved projection immediately after the where clauses".to_string(),
        estimated_improvement: 0.05,
        applied: true,
    };
    (operations, Some(applied))
}

/// Recursively constant-folds every expression reachable from the
/// pipeline's operations.
pub fn constant_folding(operations: Vec<Operation>) -> (Vec<Operation>, Option<OptimizationApplied>) {
    let mut changed = false;
    let operations = operations
        .into_iter()
        .map(|op| {
            let (op, c) = fold_operation(op);
            changed |= c;
            op
        })
        .collect();
    let applied = changed.then(|| OptimizationApplied {
        kind: "constant_folding".into(),
        description: "folded constant-literal subexpressions".to_string(),
        estimated_improvement: 0.02,
        applied: true,
    });
    (operations, applied)
}

fn fold_operation(op: Operation) -> (Operation, bool) {
    let mut changed = false;
    let mut fold = |e: Expr| {
        let (e, c) = fold_expr(e);
        changed |= c;
        e
    };
    let op = match op {
        Operation::Where(o) => Operation::Where(kql_ast::WhereOp {
            predicate: fold(o.predicate),
            span: o.span,
        }),
        Operation::Project(o) => Operation::Project(kql_ast::ProjectOp {
            columns: o
                .columns
                .into_iter()
                .map(|c| kql_ast::ProjectColumn { expr: fold(c.expr), alias: c.alias })
                .collect(),
            span: o.span,
        }),
        Operation::Extend(o) => Operation::Extend(kql_ast::ExtendOp {
            assignments: o
                .assignments
                .into_iter()
                .map(|a| kql_ast::ExtendAssignment { name: a.name, expr: fold(a.expr) })
                .collect(),
            span: o.span,
        }),
        Operation::Summarize(o) => Operation::Summarize(kql_ast::SummarizeOp {
            aggregations: o
                .aggregations
                .into_iter()
                .map(|a| kql_ast::Aggregation {
                    func: a.func,
                    expr: a.expr.map(&mut fold),
                    alias: a.alias,
                })
                .collect(),
            by: o.by.map(|by| by.into_iter().map(&mut fold).collect()),
            span: o.span,
        }),
        Operation::Order(o) => Operation::Order(kql_ast::OrderOp {
            order_by: o
                .order_by
                .into_iter()
                .map(|s| kql_ast::SortExpr { expr: fold(s.expr), direction: s.direction })
                .collect(),
            span: o.span,
        }),
        Operation::Top(o) => Operation::Top(kql_ast::TopOp {
            count: fold(o.count),
            by: o.by.map(|by| {
                by.into_iter()
                    .map(|s| kql_ast::SortExpr { expr: fold(s.expr), direction: s.direction })
                    .collect()
            }),
            span: o.span,
        }),
        Operation::Limit(o) => Operation::Limit(kql_ast::LimitOp {
            count: fold(o.count),
            span: o.span,
        }),
        Operation::Distinct(o) => Operation::Distinct(kql_ast::DistinctOp {
            columns: o.columns.map(|cols| cols.into_iter().map(&mut fold).collect()),
            span: o.span,
        }),
        Operation::Join(o) => Operation::Join(Box::new(kql_ast::JoinOp {
            kind: o.kind,
            table: o.table,
            on: fold(o.on),
            span: o.span,
        })),
        Operation::Union(o) => Operation::Union(o),
    };
    (op, changed)
}

/// Computes the set of columns unreferenced anywhere downstream.
/// Recorded but never acted on: the rule is kept as an honestly-unapplied
/// descriptor rather than silently renamed away, per the documented
/// decision to flag rather than pretend.
pub fn dead_code_elimination(operations: Vec<Operation>) -> (Vec<Operation>, OptimizationApplied) {
    let descriptor = OptimizationApplied {
        kind: "dead_code_elimination".into(),
        description: "would prune unreferenced extend/project columns; not yet implemented"
            .to_string(),
        estimated_improvement: 0.0,
        applied: false,
    };
    (operations, descriptor)
}

/// Partitions operations into `WhereOp`s, then `ProjectOp`s, then
/// everything else, preserving source order within each partition.
pub fn cost_ordered_reordering(
    operations: Vec<Operation>,
) -> (Vec<Operation>, OptimizationApplied) {
    let mut wheres = Vec::new();
    let mut projects = Vec::new();
    let mut rest = Vec::new();
    for op in operations {
        match op {
            Operation::Where(_) => wheres.push(op),
            Operation::Project(_) => projects.push(op),
            _ => rest.push(op),
        }
    }
    let mut result = Vec::with_capacity(wheres.len() + projects.len() + rest.len());
    result.extend(wheres);
    result.extend(projects);
    result.extend(rest);
    let descriptor = OptimizationApplied {
        kind: "cost_ordered_reordering".into(),
        description: "partitioned into where, project, then remaining operations".to_string(),
        estimated_improvement: 0.03,
        applied: true,
    };
    (result, descriptor)
}

/// Builds the execution plan for a final, optimized operation pipeline
/// using the deterministic per-operation cost model.
pub fn build_execution_plan(operations: &[Operation]) -> ExecutionPlan {
    let mut steps = Vec::with_capacity(operations.len() + 1);
    let mut prev_rows = 1_000_000u64;
    let mut total_cost = 10.0;
    steps.push(PlanStep {
        op_name: "TableScan".to_string(),
        description: "scan base table".to_string(),
        est_rows: prev_rows,
        est_cost: 10.0,
        index: 0,
    });

    for (i, op) in operations.iter().enumerate() {
        let prev = prev_rows as f64;
        let log2_prev = if prev > 0.0 { prev.log2() } else { 0.0 };
        let (est_rows, est_cost) = match op {
            Operation::Where(_) => ((prev * 0.1).floor() as u64, prev * 0.001),
            Operation::Project(_) => (prev_rows, prev * 0.0001),
            Operation::Summarize(_) => ((prev * 0.01).floor() as u64, prev * 0.01),
            Operation::Order(_) => (prev_rows, prev * log2_prev * 0.001),
            Operation::Top(_) => (prev_rows.min(1000), prev * log2_prev * 0.001),
            Operation::Limit(_) => (prev_rows.min(1000), 1.0),
            Operation::Distinct(_) => ((prev * 0.8).floor() as u64, prev * 0.01),
            Operation::Extend(_) | Operation::Join(_) | Operation::Union(_) => {
                (prev_rows, prev * 0.001)
            }
        };
        total_cost += est_cost;
        steps.push(PlanStep {
            op_name: capitalize(op.kind_name()),
            description: format!("{}", op),
            est_rows,
            est_cost,
            index: i + 1,
        });
        prev_rows = est_rows;
    }

    ExecutionPlan {
        steps,
        total_cost,
        optimizations: Vec::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_ast::{Query, TableExpression, WhereOp};
    use kql_common::Span;

    fn ident(name: &str) -> Expr {
        Expr::Identifier(kql_ast::IdentifierExpr { name: name.into(), span: Span::at(0) })
    }

    fn where_op(name: &str) -> Operation {
        Operation::Where(WhereOp { predicate: ident(name), span: Span::at(0) })
    }

    #[test]
    fn combines_two_or_more_where_clauses() {
        let ops = vec![where_op("a"), where_op("b"), where_op("c")];
        let (ops, applied) = predicate_combination(ops);
        assert!(applied.is_some());
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], Operation::Where(_)));
    }

    #[test]
    fn leaves_a_single_where_clause_untouched() {
        let ops = vec![where_op("a")];
        let (ops, applied) = predicate_combination(ops);
        assert!(applied.is_none());
        assert_eq!(ops.len(), 1);
    }

    #[test]
    fn reordering_moves_where_before_project_before_rest() {
        let query = Query {
            table: TableExpression { name: "logs".into(), alias: None, span: Span::at(0) },
            operations: vec![
                Operation::Limit(kql_ast::LimitOp { count: ident("n"), span: Span::at(0) }),
                where_op("a"),
            ],
            span: Span::at(0),
        };
        let (ops, applied) = cost_ordered_reordering(query.operations);
        assert!(applied.applied);
        assert!(matches!(ops[0], Operation::Where(_)));
    }

    #[test]
    fn execution_plan_starts_with_table_scan_and_shrinks_rows() {
        let ops = vec![where_op("a")];
        let plan = build_execution_plan(&ops);
        assert_eq!(plan.steps[0].op_name, "TableScan");
        assert!(plan.estimated_rows() < 1_000_000);
    }
}
