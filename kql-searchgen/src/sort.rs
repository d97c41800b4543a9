#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use kql_ast::{Expr, ProjectColumn, SortDirection, SortExpr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field_map::map_field;

/// One `field: {order}` entry of the `sort` list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SortField {
    /// The mapped backend field path.
    pub field: String,
    /// `"asc"` or `"desc"`.
    pub order: &'static str,
}

fn field_of(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(map_field(&ident.name)),
        Expr::Member(kql_ast::MemberExpr::Dot { property, .. }) => Some(map_field(property)),
        _ => None,
    }
}

/// Lowers `order by`/`top ... by` sort keys into a `sort[]` list.
/// `order by` defaults each key to ascending; non-field sort expressions
/// (anything beyond a bare identifier or `object.property`) are
/// skipped -- this generator only emits sorts the backend can execute
/// natively.
pub fn build_sort(order_by: &[SortExpr]) -> Vec<SortField> {
    order_by
        .iter()
        .filter_map(|sort_expr| {
            let field = field_of(&sort_expr.expr)?;
            let order = match sort_expr.direction {
                Some(SortDirection::Descending) => "desc",
                _ => "asc",
            };
            Some(SortField { field, order })
        })
        .collect()
}

/// Lowers a `project` clause's columns into the `_source[]` field list.
/// Non-field projections (computed expressions with no single backing
/// field) are skipped, since this generator only selects stored
/// fields, never recomputes expressions at query time.
pub fn build_source_fields(columns: &[ProjectColumn]) -> Vec<String> {
    columns
        .iter()
        .filter_map(|column| {
            let field = field_of(&column.expr)?;
            Some(column.alias.clone().unwrap_or(field))
        })
        .collect()
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
    fn order_by_defaults_to_ascending() {
        let sorts = build_sort(&[SortExpr { expr: field_expr("Timestamp"), direction: None }]);
        assert_eq!(sorts, vec![SortField { field: "@timestamp".into(), order: "asc" }]);
    }

    #[test]
    fn explicit_descending_direction_is_preserved() {
        let sorts = build_sort(&[SortExpr {
            expr: field_expr("Timestamp"),
            direction: Some(SortDirection::Descending),
        }]);
        assert_eq!(sorts[0].order, "desc");
    }

    #[test]
    fn project_columns_become_source_fields_using_alias_when_present() {
        let columns = vec![
            ProjectColumn { expr: field_expr("EventID"), alias: None },
            ProjectColumn { expr: field_expr("User"), alias: Some("actor".into()) },
        ];
        let fields = build_source_fields(&columns);
        assert_eq!(fields, vec!["event_id".to_string(), "actor".to_string()]);
    }
}
