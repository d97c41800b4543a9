#[cfg(not(feature = "std"))]
use alloc::{format, string::{String, ToString}, vec, vec::Vec};

use kql_ast::{BinaryExpr, BinaryOperator, CallExpr, CaseExpr, ConditionalExpr, Expr, Literal, LiteralValue, MemberExpr, UnaryExpr, UnaryOperator};

use crate::{
    error::GenerationError,
    quoting::{map_function_name, quote_ident},
};

/// Appends `value` to `params` and returns its positional placeholder,
/// e.g. `$3`.
fn push_param(params: &mut Vec<String>, value: String) -> String {
    params.push(value);
    format!("${}", params.len())
}

/// Emits a literal, either as a bound placeholder or (for `null`) the
/// bare SQL keyword with no placeholder consumed.
fn emit_literal(value: &LiteralValue, params: &mut Vec<String>) -> String {
    match value {
        LiteralValue::Null => "NULL".into(),
        LiteralValue::String(s) => push_param(params, s.clone()),
        LiteralValue::Number(n) => push_param(params, n.clone()),
        LiteralValue::Boolean(b) => push_param(params, b.to_string()),
        LiteralValue::DateTime(dt) => {
            let inner = dt
                .strip_prefix("datetime(")
                .and_then(|s| s.strip_suffix(')'))
                .unwrap_or(dt);
            format!("{}::timestamp", push_param(params, inner.into()))
        }
        LiteralValue::Timespan(ts) => {
            let interval = timespan_to_interval(ts);
            format!("{}::interval", push_param(params, interval))
        }
        LiteralValue::Guid(g) => format!("{}::uuid", push_param(params, g.clone())),
    }
}

/// Converts a KQL timespan suffix literal (e.g. `"30m"`, `"2d"`) into a
/// Postgres interval string (`"30 minute"`, `"2 day"`).
fn timespan_to_interval(ts: &str) -> String {
    let trimmed = ts.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(digits_end);
    let unit = match suffix {
        "d" => "day",
        "h" => "hour",
        "m" => "minute",
        "s" => "second",
        "ms" => "millisecond",
        other => other,
    };
    format!("{} {}", number, unit)
}

/// Wraps a literal string pattern for `contains`/`startswith`/`endswith`
/// per the resolved wildcard policy: the `%` wildcards are added to the
/// bound value itself, at parameter-binding time, rather than left for
/// the caller to escape. See `GenerationError` docs for why.
fn wrap_pattern(op: BinaryOperator, value: &str) -> String {
    match op {
        BinaryOperator::Contains | BinaryOperator::NotContains => format!("%{}%", value),
        BinaryOperator::StartsWith => format!("{}%", value),
        BinaryOperator::EndsWith => format!("%{}", value),
        _ => value.into(),
    }
}

/// Renders `expr` as a SQL fragment, binding every literal it contains as
/// a positional parameter (except `null`, which is bound inline).
pub fn expr_to_sql(expr: &Expr, params: &mut Vec<String>) -> Result<String, GenerationError> {
    match expr {
        Expr::Literal(Literal { value, .. }) => Ok(emit_literal(value, params)),
        Expr::Identifier(ident) => Ok(quote_ident(&ident.name)),
        Expr::Unary(UnaryExpr { op, expr, .. }) => {
            let inner = expr_to_sql(expr, params)?;
            Ok(match op {
                UnaryOperator::Not => format!("NOT ({})", inner),
                UnaryOperator::Neg => format!("-({})", inner),
                UnaryOperator::Plus => format!("+({})", inner),
            })
        }
        Expr::Member(MemberExpr::Dot { object, property, .. }) => {
            let object_sql = member_object_sql(object, params)?;
            Ok(format!("{}.{}", object_sql, quote_ident(property)))
        }
        Expr::Member(MemberExpr::Index { object, index, .. }) => {
            let object_sql = expr_to_sql(object, params)?;
            let index_sql = expr_to_sql(index, params)?;
            Ok(format!("({})->{}", object_sql, index_sql))
        }
        Expr::Call(CallExpr { callee, args, .. }) if callee.eq_ignore_ascii_case("ago") && args.len() == 1 => {
            // `ago(ts)` has no faithful single-argument Postgres builtin --
            // `AGE()` takes two timestamps, not an interval. Render it as
            // the wall-clock subtraction it actually means instead.
            let interval_sql = expr_to_sql(&args[0], params)?;
            Ok(format!("(NOW() - {})", interval_sql))
        }
        Expr::Call(CallExpr { callee, args, .. }) => {
            let mut rendered = Vec::with_capacity(args.len());
            for arg in args {
                rendered.push(expr_to_sql(arg, params)?);
            }
            Ok(format!("{}({})", map_function_name(callee), rendered.join(", ")))
        }
        Expr::Conditional(ConditionalExpr { condition, then_branch, else_branch, .. }) => {
            let cond = expr_to_sql(condition, params)?;
            let then_sql = expr_to_sql(then_branch, params)?;
            let else_sql = expr_to_sql(else_branch, params)?;
            Ok(format!("CASE WHEN {} THEN {} ELSE {} END", cond, then_sql, else_sql))
        }
        Expr::Case(CaseExpr { arms, else_branch, .. }) => {
            let mut sql = String::from("CASE");
            for arm in arms {
                let cond = expr_to_sql(&arm.condition, params)?;
                let result = expr_to_sql(&arm.result, params)?;
                sql.push_str(&format!(" WHEN {} THEN {}", cond, result));
            }
            if let Some(else_branch) = else_branch {
                sql.push_str(&format!(" ELSE {}", expr_to_sql(else_branch, params)?));
            }
            sql.push_str(" END");
            Ok(sql)
        }
        Expr::Array(array) => {
            let mut rendered = Vec::with_capacity(array.elements.len());
            for element in &array.elements {
                rendered.push(expr_to_sql(element, params)?);
            }
            Ok(format!("({})", rendered.join(", ")))
        }
        Expr::Binary(binary) => binary_to_sql(binary, params),
    }
}

fn member_object_sql(object: &Expr, params: &mut Vec<String>) -> Result<String, GenerationError> {
    match object {
        Expr::Identifier(ident) => Ok(quote_ident(&ident.name)),
        other => expr_to_sql(other, params).map(|sql| format!("({})", sql)),
    }
}

fn binary_to_sql(binary: &BinaryExpr, params: &mut Vec<String>) -> Result<String, GenerationError> {
    let BinaryExpr { op, left, right, .. } = binary;
    match op {
        BinaryOperator::And => Ok(format!(
            "{} AND {}",
            expr_to_sql(left, params)?,
            expr_to_sql(right, params)?
        )),
        BinaryOperator::Or => Ok(format!(
            "{} OR {}",
            expr_to_sql(left, params)?,
            expr_to_sql(right, params)?
        )),
        BinaryOperator::Eq => Ok(format!("{} = {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::NotEq => Ok(format!("{} != {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Lt => Ok(format!("{} < {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::LtEq => Ok(format!("{} <= {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Gt => Ok(format!("{} > {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::GtEq => Ok(format!("{} >= {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Add => Ok(format!("{} + {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Sub => Ok(format!("{} - {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Mul => Ok(format!("{} * {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Div => Ok(format!("{} / {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Mod => Ok(format!("{} % {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Matches => Ok(format!("{} ~* {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::Like => Ok(format!("{} LIKE {}", expr_to_sql(left, params)?, expr_to_sql(right, params)?)),
        BinaryOperator::In | BinaryOperator::NotIn => {
            let Expr::Array(array) = right.as_ref() else {
                return Err(GenerationError::MalformedArrayOperand(
                    "in/!in right operand must be an array".into(),
                ));
            };
            let left_sql = expr_to_sql(left, params)?;
            let mut rendered = Vec::with_capacity(array.elements.len());
            for element in &array.elements {
                rendered.push(expr_to_sql(element, params)?);
            }
            let keyword = if matches!(op, BinaryOperator::In) { "IN" } else { "NOT IN" };
            Ok(format!("{} {} ({})", left_sql, keyword, rendered.join(", ")))
        }
        BinaryOperator::Between => {
            let Expr::Array(array) = right.as_ref() else {
                return Err(GenerationError::MalformedArrayOperand(
                    "between right operand must be an array".into(),
                ));
            };
            let [low, high] = &array.elements[..] else {
                return Err(GenerationError::MalformedArrayOperand(
                    "between requires exactly two bounds".into(),
                ));
            };
            let left_sql = expr_to_sql(left, params)?;
            let low_sql = expr_to_sql(low, params)?;
            let high_sql = expr_to_sql(high, params)?;
            Ok(format!("{} BETWEEN {} AND {}", left_sql, low_sql, high_sql))
        }
        BinaryOperator::Contains | BinaryOperator::NotContains | BinaryOperator::StartsWith | BinaryOperator::EndsWith => {
            let left_sql = expr_to_sql(left, params)?;
            let keyword = if matches!(op, BinaryOperator::NotContains) { "NOT ILIKE" } else { "ILIKE" };
            let right_sql = match right.as_ref() {
                Expr::Literal(Literal { value: LiteralValue::String(s), .. }) => {
                    push_param(params, wrap_pattern(*op, s))
                }
                other => {
                    let rendered = expr_to_sql(other, params)?;
                    let (prefix, suffix) = match op {
                        BinaryOperator::StartsWith => ("", "'%'"),
                        BinaryOperator::EndsWith => ("'%'", ""),
                        _ => ("'%'", "'%'"),
                    };
                    let mut parts = Vec::new();
                    if !prefix.is_empty() {
                        parts.push(prefix.to_string());
                    }
                    parts.push(rendered);
                    if !suffix.is_empty() {
                        parts.push(suffix.to_string());
                    }
                    parts.join(" || ")
                }
            };
            Ok(format!("{} {} {}", left_sql, keyword, right_sql))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_common::Span;

    fn ident(name: &str) -> Expr {
        Expr::Identifier(kql_ast::IdentifierExpr { name: name.into(), span: Span::at(0) })
    }

    fn string_lit(s: &str) -> Expr {
        Expr::Literal(Literal { value: LiteralValue::String(s.into()), span: Span::at(0) })
    }

    #[test]
    fn equality_binds_a_single_placeholder() {
        let mut params = Vec::new();
        let expr = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Eq,
            left: Box::new(ident("severity")),
            right: Box::new(string_lit("high")),
            span: Span::at(0),
        });
        let sql = expr_to_sql(&expr, &mut params).unwrap();
        assert_eq!(sql, "\"severity\" = $1");
        assert_eq!(params, vec!["high".to_string()]);
    }

    #[test]
    fn contains_wraps_the_bound_value_with_wildcards() {
        let mut params = Vec::new();
        let expr = Expr::Binary(BinaryExpr {
            op: BinaryOperator::Contains,
            left: Box::new(ident("message")),
            right: Box::new(string_lit("fail")),
            span: Span::at(0),
        });
        let sql = expr_to_sql(&expr, &mut params).unwrap();
        assert_eq!(sql, "\"message\" ILIKE $1");
        assert_eq!(params[0], "%fail%");
    }

    #[test]
    fn null_literal_consumes_no_placeholder() {
        let mut params = Vec::new();
        let expr = Expr::Literal(Literal { value: LiteralValue::Null, span: Span::at(0) });
        let sql = expr_to_sql(&expr, &mut params).unwrap();
        assert_eq!(sql, "NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn in_list_renders_every_element_as_its_own_placeholder() {
        let mut params = Vec::new();
        let array = kql_ast::ArrayExpr {
            elements: vec![string_lit("a"), string_lit("b")],
            span: Span::at(0),
        };
        let expr = Expr::Binary(BinaryExpr {
            op: BinaryOperator::In,
            left: Box::new(ident("status")),
            right: Box::new(Expr::Array(array)),
            span: Span::at(0),
        });
        let sql = expr_to_sql(&expr, &mut params).unwrap();
        assert_eq!(sql, "\"status\" IN ($1, $2)");
    }

    #[test]
    fn timespan_literal_is_cast_to_an_interval() {
        let mut params = Vec::new();
        let expr = Expr::Literal(Literal { value: LiteralValue::Timespan("30m".into()), span: Span::at(0) });
        let sql = expr_to_sql(&expr, &mut params).unwrap();
        assert_eq!(sql, "$1::interval");
        assert_eq!(params[0], "30 minute");
    }

    #[test]
    fn ago_lowers_to_a_now_subtraction_not_age() {
        let mut params = Vec::new();
        let expr = Expr::Call(CallExpr {
            callee: "ago".into(),
            args: vec![Expr::Literal(Literal { value: LiteralValue::Timespan("1h".into()), span: Span::at(0) })],
            span: Span::at(0),
        });
        let sql = expr_to_sql(&expr, &mut params).unwrap();
        assert_eq!(sql, "(NOW() - $1::interval)");
        assert_eq!(params[0], "1 hour");
    }
}
