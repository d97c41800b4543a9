#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, string::String, vec, vec::Vec};

use kql_ast::{BinaryExpr, BinaryOperator, Expr, Literal, LiteralValue, MemberExpr, UnaryExpr, UnaryOperator};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field_map::{is_text_analyzed, map_field};

/// A scalar value carried by a leaf query clause.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchValue {
    /// A string value.
    String(String),
    /// A numeric value, kept as source text.
    Number(String),
    /// A boolean value.
    Boolean(bool),
}

/// A `bool` compound query: `must`/`should`/`must_not` clauses plus an
/// optional `minimum_should_match` (set whenever `should` is non-empty).
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoolQuery {
    /// Clauses every document must match (`and`).
    pub must: Vec<QueryNode>,
    /// Clauses at least `minimum_should_match` of which must match (`or`).
    pub should: Vec<QueryNode>,
    /// Clauses no document may match (`not`).
    pub must_not: Vec<QueryNode>,
    /// The minimum number of `should` clauses required, when `should`
    /// is non-empty.
    pub minimum_should_match: Option<u32>,
}

/// A document-search query clause. Field-keyed leaves (`Term`, `Range`,
/// ...) carry the already-mapped backend field path, never a raw KQL
/// field name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QueryNode {
    /// A compound `bool` query.
    Bool(Box<BoolQuery>),
    /// Exact-match equality (`==`).
    Term { field: String, value: SearchValue },
    /// Membership (`in`).
    Terms { field: String, values: Vec<SearchValue> },
    /// A numeric/date range (`<`, `<=`, `>`, `>=`, `between`).
    Range {
        field: String,
        gte: Option<SearchValue>,
        lte: Option<SearchValue>,
        gt: Option<SearchValue>,
        lt: Option<SearchValue>,
    },
    /// Full-text `contains` against a text-analyzed field.
    Match { field: String, value: String },
    /// Substring/prefix/suffix match against a keyword field, rendered
    /// as a wildcard pattern (`*v*`, `v*`, `*v`).
    Wildcard { field: String, pattern: String },
    /// `startswith` against a keyword field.
    Prefix { field: String, value: String },
}

fn literal_to_value(value: &LiteralValue) -> SearchValue {
    match value {
        LiteralValue::String(s) => SearchValue::String(s.clone()),
        LiteralValue::Number(n) => SearchValue::Number(n.clone()),
        LiteralValue::Boolean(b) => SearchValue::Boolean(*b),
        LiteralValue::DateTime(s) | LiteralValue::Timespan(s) | LiteralValue::Guid(s) => {
            SearchValue::String(s.clone())
        }
        LiteralValue::Null => SearchValue::String(String::new()),
    }
}

/// Resolves `expr` to a mapped backend field path. Only bare identifiers
/// and `object.property` member access name a field; anything else
/// returns `None` (the caller falls back to treating the expression as
/// unsupported rather than guessing).
fn field_path(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(map_field(&ident.name)),
        Expr::Member(MemberExpr::Dot { property, .. }) => Some(map_field(property)),
        _ => None,
    }
}

fn literal_value(expr: &Expr) -> Option<&LiteralValue> {
    match expr {
        Expr::Literal(Literal { value, .. }) => Some(value),
        _ => None,
    }
}

/// Recursively lowers a predicate expression into the `bool` query tree
/// described in the document-search contract. Returns `None` for
/// sub-expressions that carry no search-query meaning (e.g. a bare
/// scalar value with no comparison).
pub fn build_query(expr: &Expr) -> Option<QueryNode> {
    match expr {
        Expr::Unary(UnaryExpr { op: UnaryOperator::Not, expr, .. }) => {
            let inner = build_query(expr)?;
            Some(QueryNode::Bool(Box::new(BoolQuery {
                must_not: vec![inner],
                ..Default::default()
            })))
        }
        Expr::Binary(binary) => build_binary_query(binary),
        _ => None,
    }
}

fn build_binary_query(binary: &BinaryExpr) -> Option<QueryNode> {
    let BinaryExpr { op, left, right, .. } = binary;
    match op {
        BinaryOperator::And => {
            let left_q = build_query(left)?;
            let right_q = build_query(right)?;
            Some(QueryNode::Bool(Box::new(BoolQuery {
                must: vec![left_q, right_q],
                ..Default::default()
            })))
        }
        BinaryOperator::Or => {
            let left_q = build_query(left)?;
            let right_q = build_query(right)?;
            Some(QueryNode::Bool(Box::new(BoolQuery {
                should: vec![left_q, right_q],
                minimum_should_match: Some(1),
                ..Default::default()
            })))
        }
        BinaryOperator::Eq => {
            let field = field_path(left)?;
            let value = literal_value(right)?;
            Some(QueryNode::Term { field, value: literal_to_value(value) })
        }
        BinaryOperator::NotEq => {
            let field = field_path(left)?;
            let value = literal_value(right)?;
            Some(QueryNode::Bool(Box::new(BoolQuery {
                must_not: vec![QueryNode::Term { field, value: literal_to_value(value) }],
                ..Default::default()
            })))
        }
        BinaryOperator::Lt | BinaryOperator::LtEq | BinaryOperator::Gt | BinaryOperator::GtEq => {
            let field = field_path(left)?;
            let value = literal_to_value(literal_value(right)?);
            let mut range = QueryNode::Range { field, gte: None, lte: None, gt: None, lt: None };
            if let QueryNode::Range { gte, lte, gt, lt, .. } = &mut range {
                match op {
                    BinaryOperator::Lt => *lt = Some(value),
                    BinaryOperator::LtEq => *lte = Some(value),
                    BinaryOperator::Gt => *gt = Some(value),
                    BinaryOperator::GtEq => *gte = Some(value),
                    _ => unreachable!(),
                }
            }
            Some(range)
        }
        BinaryOperator::Between => {
            let field = field_path(left)?;
            let Expr::Array(array) = right.as_ref() else { return None };
            let [low, high] = &array.elements[..] else { return None };
            let gte = literal_value(low).map(literal_to_value);
            let lte = literal_value(high).map(literal_to_value);
            Some(QueryNode::Range { field, gte, lte, gt: None, lt: None })
        }
        BinaryOperator::In => {
            let field = field_path(left)?;
            let Expr::Array(array) = right.as_ref() else { return None };
            let values = array.elements.iter().filter_map(literal_value).map(literal_to_value).collect();
            Some(QueryNode::Terms { field, values })
        }
        BinaryOperator::NotIn => {
            let field = field_path(left)?;
            let Expr::Array(array) = right.as_ref() else { return None };
            let values = array.elements.iter().filter_map(literal_value).map(literal_to_value).collect();
            Some(QueryNode::Bool(Box::new(BoolQuery {
                must_not: vec![QueryNode::Terms { field, values }],
                ..Default::default()
            })))
        }
        BinaryOperator::Contains | BinaryOperator::NotContains => {
            let field = field_path(left)?;
            let LiteralValue::String(value) = literal_value(right)? else { return None };
            let node = if is_text_analyzed(&field) {
                QueryNode::Match { field, value: value.clone() }
            } else {
                QueryNode::Wildcard { field, pattern: format!("*{}*", value) }
            };
            if matches!(op, BinaryOperator::NotContains) {
                Some(QueryNode::Bool(Box::new(BoolQuery { must_not: vec![node], ..Default::default() })))
            } else {
                Some(node)
            }
        }
        BinaryOperator::StartsWith => {
            let field = field_path(left)?;
            let LiteralValue::String(value) = literal_value(right)? else { return None };
            Some(QueryNode::Prefix { field, value: value.clone() })
        }
        BinaryOperator::EndsWith => {
            let field = field_path(left)?;
            let LiteralValue::String(value) = literal_value(right)? else { return None };
            Some(QueryNode::Wildcard { field, pattern: format!("*{}", value) })
        }
        BinaryOperator::Matches | BinaryOperator::Like | BinaryOperator::Add | BinaryOperator::Sub
        | BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_ast::IdentifierExpr;
    use kql_common::Span;

    fn ident(name: &str) -> Expr {
        Expr::Identifier(IdentifierExpr { name: name.into(), span: Span::at(0) })
    }

    fn string_lit(s: &str) -> Expr {
        Expr::Literal(Literal { value: LiteralValue::String(s.into()), span: Span::at(0) })
    }

    #[test]
    fn equality_produces_a_term_query_against_the_mapped_field() {
        let expr = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Eq,
            left: Box::new(ident("EventID")),
            right: Box::new(string_lit("4625")),
            span: Span::at(0),
        });
        let query = build_query(&expr).unwrap();
        assert_eq!(
            query,
            QueryNode::Term { field: "event_id".into(), value: SearchValue::String("4625".into()) }
        );
    }

    #[test]
    fn and_combines_into_bool_must() {
        let expr = Expr::Binary(BinaryExpr {
            op: BinaryOperator::And,
            left: Box::new(Expr::Binary(BinaryExpr {
                op: BinaryOperator::Eq,
                left: Box::new(ident("severity")),
                right: Box::new(string_lit("high")),
                span: Span::at(0),
            })),
            right: Box::new(Expr::Binary(BinaryExpr {
                op: BinaryOperator::Eq,
                left: Box::new(ident("status")),
                right: Box::new(string_lit("open")),
                span: Span::at(0),
            })),
            span: Span::at(0),
        });
        match build_query(&expr).unwrap() {
            QueryNode::Bool(b) => assert_eq!(b.must.len(), 2),
            other => panic!("expected bool/must, got {:?}", other),
        }
    }

    #[test]
    fn contains_on_a_text_analyzed_field_uses_match_not_wildcard() {
        let expr = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Contains,
            left: Box::new(ident("raw_message")),
            right: Box::new(string_lit("timeout")),
            span: Span::at(0),
        });
        assert_eq!(
            build_query(&expr).unwrap(),
            QueryNode::Match { field: "raw_message".into(), value: "timeout".into() }
        );
    }

    #[test]
    fn contains_on_a_keyword_field_uses_a_wildcard() {
        let expr = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Contains,
            left: Box::new(ident("User")),
            right: Box::new(string_lit("root")),
            span: Span::at(0),
        });
        assert_eq!(
            build_query(&expr).unwrap(),
            QueryNode::Wildcard { field: "user.name".into(), pattern: "*root*".into() }
        );
    }
}
