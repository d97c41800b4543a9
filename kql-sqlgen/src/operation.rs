#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec::Vec};

use kql_ast::{JoinKind, Operation, SortDirection, SortExpr, TableExpression};

use crate::{
    error::GenerationError,
    expr::expr_to_sql,
    quoting::{map_function_name, quote_ident},
};

fn join_kind_sql(kind: JoinKind) -> Result<&'static str, GenerationError> {
    match kind {
        JoinKind::Inner => Ok("INNER"),
        JoinKind::Left => Ok("LEFT"),
        JoinKind::Right => Ok("RIGHT"),
        JoinKind::Full => Ok("FULL OUTER"),
        JoinKind::LeftAnti | JoinKind::RightSemi => Err(GenerationError::UnsupportedJoinKind(kind)),
    }
}

fn table_sql(table: &TableExpression) -> String {
    match &table.alias {
        Some(alias) => format!("{} {}", quote_ident(&table.name), quote_ident(alias)),
        None => quote_ident(&table.name),
    }
}

fn sort_expr_sql(sort: &SortExpr, params: &mut Vec<String>) -> Result<String, GenerationError> {
    let expr_sql = expr_to_sql(&sort.expr, params)?;
    let direction = match sort.direction {
        Some(SortDirection::Descending) => " DESC",
        Some(SortDirection::Ascending) | None => "",
    };
    Ok(format!("{}{}", expr_sql, direction))
}

fn render_sort_list(sorts: &[SortExpr], params: &mut Vec<String>) -> Result<String, GenerationError> {
    let mut rendered = Vec::with_capacity(sorts.len());
    for sort in sorts {
        rendered.push(sort_expr_sql(sort, params)?);
    }
    Ok(rendered.join(", "))
}

/// Wraps `prior` (itself a parenthesized, already-valid `FROM` source) in
/// the SQL for one pipeline operation, per the translation rules.
pub fn apply_operation(
    op: &Operation,
    prior: String,
    params: &mut Vec<String>,
) -> Result<String, GenerationError> {
    match op {
        Operation::Where(where_op) => {
            let predicate = expr_to_sql(&where_op.predicate, params)?;
            Ok(format!("(SELECT * FROM {} base WHERE {})", prior, predicate))
        }
        Operation::Project(project) => {
            let mut columns = Vec::with_capacity(project.columns.len());
            for column in &project.columns {
                let expr_sql = expr_to_sql(&column.expr, params)?;
                columns.push(match &column.alias {
                    Some(alias) => format!("{} AS {}", expr_sql, quote_ident(alias)),
                    None => expr_sql,
                });
            }
            Ok(format!("(SELECT {} FROM {} base)", columns.join(", "), prior))
        }
        Operation::Extend(extend) => {
            let mut assignments = Vec::with_capacity(extend.assignments.len());
            for assignment in &extend.assignments {
                let expr_sql = expr_to_sql(&assignment.expr, params)?;
                assignments.push(format!("{} AS {}", expr_sql, quote_ident(&assignment.name)));
            }
            Ok(format!(
                "(SELECT base.*, {} FROM {} base)",
                assignments.join(", "),
                prior
            ))
        }
        Operation::Summarize(summarize) => {
            let mut aggs = Vec::with_capacity(summarize.aggregations.len());
            for agg in &summarize.aggregations {
                let inner = match &agg.expr {
                    Some(expr) => expr_to_sql(expr, params)?,
                    None => "*".into(),
                };
                let call = format!("{}({})", map_function_name(&agg.func), inner);
                aggs.push(match &agg.alias {
                    Some(alias) => format!("{} AS {}", call, quote_ident(alias)),
                    None => call,
                });
            }
            let mut select_list = aggs;
            let mut group_by = String::new();
            if let Some(by) = &summarize.by {
                let mut by_cols = Vec::with_capacity(by.len());
                for expr in by {
                    by_cols.push(expr_to_sql(expr, params)?);
                }
                select_list.splice(0..0, by_cols.iter().cloned());
                group_by = format!(" GROUP BY {}", by_cols.join(", "));
            }
            Ok(format!(
                "(SELECT {} FROM {} base{})",
                select_list.join(", "),
                prior,
                group_by
            ))
        }
        Operation::Order(order) => {
            let sort_list = render_sort_list(&order.order_by, params)?;
            Ok(format!("(SELECT * FROM {} base ORDER BY {})", prior, sort_list))
        }
        Operation::Top(top) => {
            let count_sql = expr_to_sql(&top.count, params)?;
            let order_clause = match &top.by {
                Some(by) => format!(" ORDER BY {}", render_sort_list(by, params)?),
                None => String::new(),
            };
            Ok(format!(
                "(SELECT * FROM {} base{} LIMIT {})",
                prior, order_clause, count_sql
            ))
        }
        Operation::Limit(limit) => {
            let count_sql = expr_to_sql(&limit.count, params)?;
            Ok(format!("(SELECT * FROM {} base LIMIT {})", prior, count_sql))
        }
        Operation::Distinct(distinct) => match &distinct.columns {
            Some(columns) => {
                let mut rendered = Vec::with_capacity(columns.len());
                for column in columns {
                    rendered.push(expr_to_sql(column, params)?);
                }
                Ok(format!(
                    "(SELECT DISTINCT {} FROM {} base)",
                    rendered.join(", "),
                    prior
                ))
            }
            None => Ok(format!("(SELECT DISTINCT * FROM {} base)", prior)),
        },
        Operation::Join(join) => {
            let kind_sql = join_kind_sql(join.kind)?;
            let on_sql = expr_to_sql(&join.on, params)?;
            Ok(format!(
                "(SELECT * FROM {} base {} JOIN {} ON {})",
                prior,
                kind_sql,
                table_sql(&join.table),
                on_sql
            ))
        }
        Operation::Union(union) => {
            let mut branches = Vec::with_capacity(union.tables.len() + 1);
            branches.push(format!("SELECT * FROM {}", prior));
            for table in &union.tables {
                branches.push(format!("SELECT * FROM {}", table_sql(table)));
            }
            Ok(format!("({})", branches.join(" UNION ALL ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_ast::{Expr, IdentifierExpr, WhereOp};
    use kql_common::Span;

    #[test]
    fn where_wraps_the_prior_source_with_a_predicate() {
        let mut params = Vec::new();
        let op = Operation::Where(WhereOp {
            predicate: Expr::Identifier(IdentifierExpr { name: "active".into(), span: Span::at(0) }),
            span: Span::at(0),
        });
        let sql = apply_operation(&op, "(SELECT * FROM \"logs\")".into(), &mut params).unwrap();
        assert_eq!(sql, "(SELECT * FROM (SELECT * FROM \"logs\") base WHERE \"active\")");
    }

    #[test]
    fn leftanti_join_is_rejected() {
        let mut params = Vec::new();
        let op = Operation::Join(Box::new(kql_ast::JoinOp {
            kind: JoinKind::LeftAnti,
            table: TableExpression { name: "users".into(), alias: None, span: Span::at(0) },
            on: Expr::Identifier(IdentifierExpr { name: "x".into(), span: Span::at(0) }),
            span: Span::at(0),
        }));
        let result = apply_operation(&op, "(SELECT * FROM \"logs\")".into(), &mut params);
        assert!(matches!(result, Err(GenerationError::UnsupportedJoinKind(JoinKind::LeftAnti))));
    }
}
