#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

use kql_common::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::display_comma_separated;

/// The typed value carried by a [`Literal`] node, tagged with its KQL
/// data type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LiteralValue {
    /// A string literal's unescaped contents.
    String(String),
    /// A numeric literal, kept as its original source text so integer vs.
    /// float fidelity survives unchanged until a generator parses it.
    Number(String),
    /// `true` / `false`.
    Boolean(bool),
    /// A `datetime(...)` literal's full source text, including the
    /// `datetime(...)` wrapper.
    DateTime(String),
    /// A timespan literal's source text, e.g. `"1h"`, `"30ms"`.
    Timespan(String),
    /// A canonical `8-4-4-4-12` GUID literal's source text.
    Guid(String),
    /// `null`.
    Null,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "\"{}\"", s),
            LiteralValue::Number(s) => write!(f, "{}", s),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::DateTime(s) => write!(f, "{}", s),
            LiteralValue::Timespan(s) => write!(f, "{}", s),
            LiteralValue::Guid(s) => write!(f, "{}", s),
            LiteralValue::Null => f.write_str("null"),
        }
    }
}

/// A literal expression node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Literal {
    /// The literal's typed value.
    pub value: LiteralValue,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Binary operators, covering the or/and/equality/comparison/string-op/
/// additive/multiplicative precedence levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum BinaryOperator {
    Or,
    And,

    Eq,
    NotEq,

    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `expr in (list)`; the right operand is always an [`Expr::Array`].
    In,
    /// `expr !in (list)`; the right operand is always an [`Expr::Array`].
    NotIn,
    /// `expr between (low .. high)`; the right operand is always a
    /// two-element [`Expr::Array`] of `[low, high]`.
    Between,

    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Matches,
    Like,

    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::In => "in",
            BinaryOperator::NotIn => "!in",
            BinaryOperator::Between => "between",
            BinaryOperator::Contains => "contains",
            BinaryOperator::NotContains => "!contains",
            BinaryOperator::StartsWith => "startswith",
            BinaryOperator::EndsWith => "endswith",
            BinaryOperator::Matches => "matches",
            BinaryOperator::Like => "like",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
        })
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOperator {
    /// `not expr`
    Not,
    /// `-expr`
    Neg,
    /// `+expr`
    Plus,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOperator::Not => "not ",
            UnaryOperator::Neg => "-",
            UnaryOperator::Plus => "+",
        })
    }
}

/// `left op right`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinaryExpr {
    /// The operator.
    pub op: BinaryOperator,
    /// Left operand.
    pub left: Box<Expr>,
    /// Right operand.
    pub right: Box<Expr>,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// `op expr`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnaryExpr {
    /// The operator.
    pub op: UnaryOperator,
    /// The operand.
    pub expr: Box<Expr>,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for UnaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.expr)
    }
}

/// A scalar function call `callee(args...)`. Only formed when the callee
/// is a bare identifier at the point `(` is seen, per the grammar.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CallExpr {
    /// The function name.
    pub callee: String,
    /// Call arguments.
    pub args: Vec<Expr>,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for CallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.callee, display_comma_separated(&self.args))
    }
}

/// `object.property` or `object[index]` member access. Per the grammar,
/// dotted access always consumes a bare identifier on the right; bracket
/// access accepts a full expression.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MemberExpr {
    /// `object.property`
    Dot {
        /// The left-hand object expression.
        object: Box<Expr>,
        /// The bare identifier on the right of `.`.
        property: String,
        /// Source span.
        span: Span,
    },
    /// `object[index]`
    Index {
        /// The left-hand object expression.
        object: Box<Expr>,
        /// The bracketed index expression.
        index: Box<Expr>,
        /// Source span.
        span: Span,
    },
}

impl fmt::Display for MemberExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberExpr::Dot { object, property, .. } => write!(f, "{}.{}", object, property),
            MemberExpr::Index { object, index, .. } => write!(f, "{}[{}]", object, index),
        }
    }
}

/// `iif(condition, then_expr, else_expr)`, KQL's ternary builtin. The
/// parser recognizes calls to `iif`/`iff` specially and lowers them to
/// this node instead of [`Expr::Call`], since it is the one KQL
/// expression-level conditional and downstream passes (constant folding,
/// SQL generation) benefit from matching on it directly rather than
/// re-deriving ternary shape from a generic call's argument list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConditionalExpr {
    /// The condition.
    pub condition: Box<Expr>,
    /// Value when `condition` is true.
    pub then_branch: Box<Expr>,
    /// Value when `condition` is false.
    pub else_branch: Box<Expr>,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for ConditionalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iif({}, {}, {})",
            self.condition, self.then_branch, self.else_branch
        )
    }
}

/// One `when condition then result` arm of a [`CaseExpr`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaseArm {
    /// The arm's condition.
    pub condition: Expr,
    /// The arm's result when `condition` holds.
    pub result: Expr,
}

/// `case when c1 then r1 when c2 then r2 ... else rN end`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaseExpr {
    /// The `when ... then ...` arms, tried in order.
    pub arms: Vec<CaseArm>,
    /// The optional trailing `else`.
    pub else_branch: Option<Box<Expr>>,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for CaseExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("case")?;
        for arm in &self.arms {
            write!(f, " when {} then {}", arm.condition, arm.result)?;
        }
        if let Some(else_branch) = &self.else_branch {
            write!(f, " else {}", else_branch)?;
        }
        f.write_str(" end")
    }
}

/// `[e1, e2, ...]`, also reused as the right operand shape for `in` and
/// `between`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrayExpr {
    /// The array elements.
    pub elements: Vec<Expr>,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for ArrayExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", display_comma_separated(&self.elements))
    }
}

/// A bare or backtick-quoted identifier reference.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdentifierExpr {
    /// The identifier's name.
    pub name: String,
    /// Source span.
    pub span: Span,
}

impl fmt::Display for IdentifierExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The closed KQL expression sum type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// `left op right`.
    Binary(BinaryExpr),
    /// `op expr`.
    Unary(UnaryExpr),
    /// `callee(args...)`.
    Call(CallExpr),
    /// `object.property` or `object[index]`.
    Member(MemberExpr),
    /// `iif(cond, then, else)`.
    Conditional(ConditionalExpr),
    /// `case when ... then ... end`.
    Case(CaseExpr),
    /// `[e1, e2, ...]`.
    Array(ArrayExpr),
    /// A bare identifier.
    Identifier(IdentifierExpr),
    /// A typed literal.
    Literal(Literal),
}

impl Expr {
    /// The span covering this expression's full source text.
    pub fn span(&self) -> Span {
        match self {
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Member(MemberExpr::Dot { span, .. } | MemberExpr::Index { span, .. }) => *span,
            Expr::Conditional(e) => e.span,
            Expr::Case(e) => e.span,
            Expr::Array(e) => e.span,
            Expr::Identifier(e) => e.span,
            Expr::Literal(e) => e.span,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary(e) => write!(f, "{}", e),
            Expr::Unary(e) => write!(f, "{}", e),
            Expr::Call(e) => write!(f, "{}", e),
            Expr::Member(e) => write!(f, "{}", e),
            Expr::Conditional(e) => write!(f, "{}", e),
            Expr::Case(e) => write!(f, "{}", e),
            Expr::Array(e) => write!(f, "{}", e),
            Expr::Identifier(e) => write!(f, "{}", e),
            Expr::Literal(e) => write!(f, "{}", e),
        }
    }
}
