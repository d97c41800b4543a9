#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

use kql_ast::{Aggregation, Expr, SummarizeOp};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field_map::map_field;

/// The default percentile ranks used when a `percentile`/`percentiles`
/// aggregation doesn't narrow its own list.
pub const DEFAULT_PERCENTS: &[f64] = &[50.0, 90.0, 99.0];

/// A leaf metric aggregation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetricAgg {
    /// `count()`.
    Count,
    /// `sum(field)`.
    Sum { field: String },
    /// `avg(field)`.
    Avg { field: String },
    /// `min(field)`.
    Min { field: String },
    /// `max(field)`.
    Max { field: String },
    /// `dcount(field)` -- approximate distinct count.
    Cardinality { field: String },
    /// `percentile`/`percentiles(field)`.
    Percentiles { field: String, percents: Vec<f64> },
}

/// An aggregation tree node: either a leaf metric or a `terms` bucket
/// wrapping further nested aggregations (one level per `by` column).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AggregationNode {
    /// A leaf metric aggregation.
    Metric(MetricAgg),
    /// A `terms` bucket over `field`, with nested named aggregations.
    Terms { field: String, sub_aggs: Vec<(String, AggregationNode)> },
}

fn field_of(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(map_field(&ident.name)),
        Expr::Member(kql_ast::MemberExpr::Dot { property, .. }) => Some(map_field(property)),
        _ => None,
    }
}

/// Builds one named metric aggregation from a `summarize` entry. The
/// name follows the `<fn>_<field>` scheme unless an explicit alias is
/// given.
fn metric_aggregation(agg: &Aggregation) -> (String, MetricAgg) {
    let func = agg.func.to_ascii_lowercase();
    let field = agg.expr.as_ref().and_then(field_of);
    let metric = match (func.as_str(), &field) {
        ("count", _) => MetricAgg::Count,
        ("sum", Some(f)) => MetricAgg::Sum { field: f.clone() },
        ("avg", Some(f)) => MetricAgg::Avg { field: f.clone() },
        ("min", Some(f)) => MetricAgg::Min { field: f.clone() },
        ("max", Some(f)) => MetricAgg::Max { field: f.clone() },
        ("dcount", Some(f)) => MetricAgg::Cardinality { field: f.clone() },
        ("percentile", Some(f)) | ("percentiles", Some(f)) => {
            MetricAgg::Percentiles { field: f.clone(), percents: DEFAULT_PERCENTS.to_vec() }
        }
        _ => MetricAgg::Count,
    };
    let default_name = match &field {
        Some(f) => format!("{}_{}", func, f),
        None => func.clone(),
    };
    let name = agg.alias.clone().unwrap_or(default_name);
    (name, metric)
}

/// Lowers a `summarize` operation into its named aggregation tree.
///
/// Without `by`, every entry is a sibling leaf metric. With `by`, the
/// group-by columns become a chain of `terms` buckets -- in declaration
/// order, outermost first -- wrapping the metrics at the innermost
/// leaf.
pub fn build_aggregations(op: &SummarizeOp) -> Vec<(String, AggregationNode)> {
    let metrics: Vec<(String, AggregationNode)> = op
        .aggregations
        .iter()
        .map(|agg| {
            let (name, metric) = metric_aggregation(agg);
            (name, AggregationNode::Metric(metric))
        })
        .collect();

    let Some(by) = &op.by else {
        return metrics;
    };
    let fields: Vec<String> = by.iter().filter_map(field_of).collect();
    if fields.is_empty() {
        return metrics;
    }

    let mut node = metrics;
    for field in fields.iter().rev() {
        let name = format!("group_by_{}", field);
        node = vec![(name, AggregationNode::Terms { field: field.clone(), sub_aggs: node })];
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_ast::IdentifierExpr;
    use kql_common::Span;

    fn field_expr(name: &str) -> Expr {
        Expr::Identifier(IdentifierExpr { name: name.into(), span: Span::at(0) })
    }

    #[test]
    fn count_with_no_by_produces_a_single_metric_leaf() {
        let op = SummarizeOp {
            aggregations: vec![Aggregation { func: "count".into(), expr: None, alias: None }],
            by: None,
            span: Span::at(0),
        };
        let aggs = build_aggregations(&op);
        assert_eq!(aggs, vec![("count".into(), AggregationNode::Metric(MetricAgg::Count))]);
    }

    #[test]
    fn sum_with_an_alias_uses_the_alias_as_its_name() {
        let op = SummarizeOp {
            aggregations: vec![Aggregation {
                func: "sum".into(),
                expr: Some(field_expr("amount")),
                alias: Some("total".into()),
            }],
            by: None,
            span: Span::at(0),
        };
        let aggs = build_aggregations(&op);
        assert_eq!(
            aggs,
            vec![("total".into(), AggregationNode::Metric(MetricAgg::Sum { field: "amount".into() }))]
        );
    }

    #[test]
    fn by_wraps_metrics_in_a_chain_of_terms_buckets_outermost_first() {
        let op = SummarizeOp {
            aggregations: vec![Aggregation { func: "count".into(), expr: None, alias: None }],
            by: Some(vec![field_expr("Host"), field_expr("severity")]),
            span: Span::at(0),
        };
        let aggs = build_aggregations(&op);
        assert_eq!(aggs.len(), 1);
        let (name, node) = &aggs[0];
        assert_eq!(name, "group_by_host.name");
        match node {
            AggregationNode::Terms { field, sub_aggs } => {
                assert_eq!(field, "host.name");
                assert_eq!(sub_aggs[0].0, "group_by_severity");
            }
            other => panic!("expected outer terms bucket, got {:?}", other),
        }
    }

    #[test]
    fn percentile_aggregations_default_to_p50_p90_p99() {
        let op = SummarizeOp {
            aggregations: vec![Aggregation {
                func: "percentile".into(),
                expr: Some(field_expr("duration_ms")),
                alias: None,
            }],
            by: None,
            span: Span::at(0),
        };
        let aggs = build_aggregations(&op);
        match &aggs[0].1 {
            AggregationNode::Metric(MetricAgg::Percentiles { percents, .. }) => {
                assert_eq!(percents, &[50.0, 90.0, 99.0]);
            }
            other => panic!("expected percentiles metric, got {:?}", other),
        }
    }
}
