#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, format, string::String, vec::Vec};

use kql_ast::{
    ArrayExpr, BinaryExpr, BinaryOperator, CallExpr, CaseArm, CaseExpr, ConditionalExpr, Expr,
    Literal, LiteralValue, MemberExpr, UnaryExpr,
};

/// A parsed numeric literal, kept separate so integer arithmetic can use
/// checked operations and float arithmetic can follow IEEE-754 rules.
#[derive(Clone, Copy)]
enum NumLit {
    Int(i64),
    Float(f64),
}

impl NumLit {
    fn parse(s: &str) -> Option<NumLit> {
        if let Ok(i) = s.parse::<i64>() {
            Some(NumLit::Int(i))
        } else if let Ok(f) = s.parse::<f64>() {
            Some(NumLit::Float(f))
        } else {
            None
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            NumLit::Int(i) => i as f64,
            NumLit::Float(f) => f,
        }
    }
}

/// Recursively folds constant-literal binary subexpressions throughout
/// `expr`. Returns the rewritten expression and whether any fold fired.
pub fn fold_expr(expr: Expr) -> (Expr, bool) {
    match expr {
        Expr::Binary(BinaryExpr { op, left, right, span }) => {
            let (left, left_changed) = fold_expr(*left);
            let (right, right_changed) = fold_expr(*right);
            if let (Expr::Literal(Literal { value: lv, .. }), Expr::Literal(Literal { value: rv, .. })) =
                (&left, &right)
            {
                if let Some(folded) = fold_binary_literals(op, lv, rv) {
                    return (Expr::Literal(Literal { value: folded, span }), true);
                }
            }
            (
                Expr::Binary(BinaryExpr {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }),
                left_changed || right_changed,
            )
        }
        Expr::Unary(UnaryExpr { op, expr, span }) => {
            let (expr, changed) = fold_expr(*expr);
            (Expr::Unary(UnaryExpr { op, expr: Box::new(expr), span }), changed)
        }
        Expr::Call(CallExpr { callee, args, span }) => {
            let mut changed = false;
            let args = args
                .into_iter()
                .map(|a| {
                    let (a, c) = fold_expr(a);
                    changed |= c;
                    a
                })
                .collect::<Vec<_>>();
            (Expr::Call(CallExpr { callee, args, span }), changed)
        }
        Expr::Member(MemberExpr::Dot { object, property, span }) => {
            let (object, changed) = fold_expr(*object);
            (
                Expr::Member(MemberExpr::Dot { object: Box::new(object), property, span }),
                changed,
            )
        }
        Expr::Member(MemberExpr::Index { object, index, span }) => {
            let (object, c1) = fold_expr(*object);
            let (index, c2) = fold_expr(*index);
            (
                Expr::Member(MemberExpr::Index {
                    object: Box::new(object),
                    index: Box::new(index),
                    span,
                }),
                c1 || c2,
            )
        }
        Expr::Conditional(ConditionalExpr { condition, then_branch, else_branch, span }) => {
            let (condition, c1) = fold_expr(*condition);
            let (then_branch, c2) = fold_expr(*then_branch);
            let (else_branch, c3) = fold_expr(*else_branch);
            (
                Expr::Conditional(ConditionalExpr {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                    span,
                }),
                c1 || c2 || c3,
            )
        }
        Expr::Case(CaseExpr { arms, else_branch, span }) => {
            let mut changed = false;
            let arms = arms
                .into_iter()
                .map(|CaseArm { condition, result }| {
                    let (condition, c1) = fold_expr(condition);
                    let (result, c2) = fold_expr(result);
                    changed |= c1 || c2;
                    CaseArm { condition, result }
                })
                .collect::<Vec<_>>();
            let else_branch = else_branch.map(|e| {
                let (e, c) = fold_expr(*e);
                changed |= c;
                Box::new(e)
            });
            (Expr::Case(CaseExpr { arms, else_branch, span }), changed)
        }
        Expr::Array(ArrayExpr { elements, span }) => {
            let mut changed = false;
            let elements = elements
                .into_iter()
                .map(|e| {
                    let (e, c) = fold_expr(e);
                    changed |= c;
                    e
                })
                .collect::<Vec<_>>();
            (Expr::Array(ArrayExpr { elements, span }), changed)
        }
        other @ (Expr::Identifier(_) | Expr::Literal(_)) => (other, false),
    }
}

fn literal_eq(left: &LiteralValue, right: &LiteralValue) -> Option<bool> {
    if let (LiteralValue::Number(l), LiteralValue::Number(r)) = (left, right) {
        let (l, r) = (NumLit::parse(l)?, NumLit::parse(r)?);
        return Some(l.as_f64() == r.as_f64());
    }
    Some(left == right)
}

fn fold_numeric_cmp(op: BinaryOperator, left: &NumLit, right: &NumLit) -> LiteralValue {
    let (l, r) = (left.as_f64(), right.as_f64());
    let result = match op {
        BinaryOperator::Lt => l < r,
        BinaryOperator::LtEq => l <= r,
        BinaryOperator::Gt => l > r,
        BinaryOperator::GtEq => l >= r,
        _ => unreachable!("fold_numeric_cmp only called for ordering operators"),
    };
    LiteralValue::Boolean(result)
}

/// Folds `left op right` arithmetic per the documented policy: integer
/// division/modulo by zero is left unfolded (deferred to execution);
/// float division by zero follows IEEE-754 (produces `inf`/`nan`/`-inf`);
/// integer overflow in `+ - *` leaves the expression unfolded rather than
/// wrapping or panicking.
fn fold_arith(op: BinaryOperator, left: NumLit, right: NumLit) -> Option<LiteralValue> {
    match (left, right) {
        (NumLit::Int(a), NumLit::Int(b)) => {
            let result = match op {
                BinaryOperator::Add => a.checked_add(b),
                BinaryOperator::Sub => a.checked_sub(b),
                BinaryOperator::Mul => a.checked_mul(b),
                BinaryOperator::Div => {
                    if b == 0 {
                        None
                    } else {
                        a.checked_div(b)
                    }
                }
                BinaryOperator::Mod => {
                    if b == 0 {
                        None
                    } else {
                        a.checked_rem(b)
                    }
                }
                _ => unreachable!("fold_arith only called for arithmetic operators"),
            };
            result.map(|v| LiteralValue::Number(format!("{}", v)))
        }
        (a, b) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            let result = match op {
                BinaryOperator::Add => a + b,
                BinaryOperator::Sub => a - b,
                BinaryOperator::Mul => a * b,
                BinaryOperator::Div => a / b,
                BinaryOperator::Mod => a % b,
                _ => unreachable!("fold_arith only called for arithmetic operators"),
            };
            Some(LiteralValue::Number(format!("{}", result)))
        }
    }
}

fn fold_binary_literals(
    op: BinaryOperator,
    left: &LiteralValue,
    right: &LiteralValue,
) -> Option<LiteralValue> {
    match op {
        BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => {
            let (LiteralValue::Number(l), LiteralValue::Number(r)) = (left, right) else {
                return None;
            };
            fold_arith(op, NumLit::parse(l)?, NumLit::parse(r)?)
        }
        BinaryOperator::Eq => literal_eq(left, right).map(LiteralValue::Boolean),
        BinaryOperator::NotEq => literal_eq(left, right).map(|b| LiteralValue::Boolean(!b)),
        BinaryOperator::Lt | BinaryOperator::LtEq | BinaryOperator::Gt | BinaryOperator::GtEq => {
            let (LiteralValue::Number(l), LiteralValue::Number(r)) = (left, right) else {
                return None;
            };
            Some(fold_numeric_cmp(op, &NumLit::parse(l)?, &NumLit::parse(r)?))
        }
        _ => None,
    }
}
