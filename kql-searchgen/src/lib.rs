//! # kql-searchgen
//!
//! Lowers a KQL query tree into a document-search query/aggregation DSL:
//! a `bool` query tree, a named aggregation tree, a sort list, and a
//! `_source` field list, shaped for an Elasticsearch-style backend.
//! Unlike [`kql_sqlgen`]'s single linear SQL statement, this generator
//! walks the query by operation *kind* rather than pipeline shape --
//! every `where` predicate folds into one query tree, every `summarize`
//! contributes to one aggregation tree, and so on -- since a
//! document-search request has no notion of nested subqueries.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec::Vec};

mod aggs;
mod field_map;
mod query;
mod sort;

pub use self::aggs::{AggregationNode, MetricAgg, DEFAULT_PERCENTS};
pub use self::query::{BoolQuery, QueryNode, SearchValue};
pub use self::sort::SortField;

use kql_ast::{BinaryExpr, BinaryOperator, Expr, Operation, Query};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The full result of document-search generation.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchOutput {
    /// The combined `bool` query tree, if any `where` predicate was
    /// translatable.
    pub query: Option<QueryNode>,
    /// Named aggregations collected from every `summarize` operation,
    /// in declaration order.
    pub aggs: Vec<(String, AggregationNode)>,
    /// The `sort[]` list collected from `order by` and `top ... by`.
    pub sort: Vec<SortField>,
    /// The `_source[]` field list collected from `project`.
    pub source: Vec<String>,
}

fn and_together(predicates: Vec<Expr>) -> Option<Expr> {
    let mut iter = predicates.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, next| {
        let span = acc.span().cover(next.span());
        Expr::Binary(BinaryExpr { op: BinaryOperator::And, left: Box::new(acc), right: Box::new(next), span })
    }))
}

/// Walks `query` by operation kind and produces the combined search
/// request: one `bool` query tree, one aggregation tree, one sort list
/// and one source field list, regardless of how many operations of
/// each kind the pipeline contains.
pub fn generate_search(query: &Query) -> SearchOutput {
    let mut predicates = Vec::new();
    let mut aggs = Vec::new();
    let mut sort = Vec::new();
    let mut source = Vec::new();

    for op in &query.operations {
        match op {
            Operation::Where(where_op) => predicates.push(where_op.predicate.clone()),
            Operation::Summarize(summarize_op) => aggs.extend(aggs::build_aggregations(summarize_op)),
            Operation::Order(order_op) => sort.extend(sort::build_sort(&order_op.order_by)),
            Operation::Top(top_op) => {
                if let Some(by) = &top_op.by {
                    sort.extend(sort::build_sort(by));
                }
            }
            Operation::Project(project_op) => source.extend(sort::build_source_fields(&project_op.columns)),
            _ => {}
        }
    }

    let search_query = and_together(predicates).and_then(|expr| query::build_query(&expr));

    SearchOutput { query: search_query, aggs, sort, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_ast::{
        Aggregation, IdentifierExpr, Literal, LiteralValue, ProjectColumn, ProjectOp, SummarizeOp, TableExpression,
        WhereOp,
    };
    use kql_common::Span;

    fn ident(name: &str) -> Expr {
        Expr::Identifier(IdentifierExpr { name: name.into(), span: Span::at(0) })
    }

    #[test]
    fn a_query_with_where_summarize_and_project_populates_every_field() {
        let predicate = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Eq,
            left: Box::new(ident("EventID")),
            right: Box::new(Expr::Literal(Literal { value: LiteralValue::String("4625".into()), span: Span::at(0) })),
            span: Span::at(0),
        });
        let query = Query {
            table: TableExpression { name: "logs".into(), alias: None, span: Span::at(0) },
            operations: vec![
                Operation::Where(WhereOp { predicate, span: Span::at(0) }),
                Operation::Summarize(SummarizeOp {
                    aggregations: vec![Aggregation { func: "count".into(), expr: None, alias: None }],
                    by: None,
                    span: Span::at(0),
                }),
                Operation::Project(ProjectOp {
                    columns: vec![ProjectColumn { expr: ident("User"), alias: None }],
                    span: Span::at(0),
                }),
            ],
            span: Span::at(0),
        };

        let output = generate_search(&query);
        assert!(output.query.is_some());
        assert_eq!(output.aggs.len(), 1);
        assert_eq!(output.source, vec!["user.name".to_string()]);
    }

    #[test]
    fn multiple_where_clauses_combine_with_and_before_translation() {
        let left = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Eq,
            left: Box::new(ident("severity")),
            right: Box::new(Expr::Literal(Literal { value: LiteralValue::String("high".into()), span: Span::at(0) })),
            span: Span::at(0),
        });
        let right = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Eq,
            left: Box::new(ident("status")),
            right: Box::new(Expr::Literal(Literal { value: LiteralValue::String("open".into()), span: Span::at(0) })),
            span: Span::at(0),
        });
        let query = Query {
            table: TableExpression { name: "logs".into(), alias: None, span: Span::at(0) },
            operations: vec![
                Operation::Where(WhereOp { predicate: left, span: Span::at(0) }),
                Operation::Where(WhereOp { predicate: right, span: Span::at(0) }),
            ],
            span: Span::at(0),
        };

        match generate_search(&query).query.unwrap() {
            QueryNode::Bool(b) => assert_eq!(b.must.len(), 2),
            other => panic!("expected combined bool/must, got {:?}", other),
        }
    }

    #[test]
    fn no_operations_produce_an_empty_output() {
        let query = Query {
            table: TableExpression { name: "logs".into(), alias: None, span: Span::at(0) },
            operations: Vec::new(),
            span: Span::at(0),
        };
        let output = generate_search(&query);
        assert_eq!(output, SearchOutput::default());
    }
}
