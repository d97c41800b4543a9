#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

use kql_common::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{expr::Expr, query::TableExpression, utils::display_comma_separated};

/// Sort direction for `order by` / `top ... by`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SortDirection {
    /// `asc`
    Ascending,
    /// `desc`
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        })
    }
}

/// One `expr [asc|desc]` entry of an `order by` / `top ... by` clause.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SortExpr {
    /// The expression to sort by.
    pub expr: Expr,
    /// Explicit direction, if given; `order by` defaults to ascending.
    pub direction: Option<SortDirection>,
}

impl fmt::Display for SortExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(dir) = self.direction {
            write!(f, " {}", dir)?;
        }
        Ok(())
    }
}

/// One `expr [as alias]` entry of a `project` clause.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectColumn {
    /// The projected expression.
    pub expr: Expr,
    /// Optional `as` alias.
    pub alias: Option<String>,
}

impl fmt::Display for ProjectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias)?;
        }
        Ok(())
    }
}

/// One `name = expr` assignment of an `extend` clause.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtendAssignment {
    /// The new column's name.
    pub name: String,
    /// The expression it is bound to.
    pub expr: Expr,
}

impl fmt::Display for ExtendAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.expr)
    }
}

/// One `fn(expr?) [as alias]` entry of a `summarize` clause.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aggregation {
    /// The aggregation function name, e.g. `count`, `sum`, `avg`.
    pub func: String,
    /// The aggregated expression; absent for arity-0 functions like `count()`.
    pub expr: Option<Expr>,
    /// Optional `as` alias.
    pub alias: Option<String>,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.func)?;
        if let Some(expr) = &self.expr {
            write!(f, "{}", expr)?;
        }
        f.write_str(")")?;
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias)?;
        }
        Ok(())
    }
}

/// Join kind, per the grammar's optional modifier before the joined
/// table expression.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JoinKind {
    /// `join` (defaults to inner) / `join inner`.
    Inner,
    /// `join left`.
    Left,
    /// `join right`.
    Right,
    /// `join full`.
    Full,
    /// `join leftanti`.
    LeftAnti,
    /// `join rightsemi`.
    RightSemi,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Full => "full",
            JoinKind::LeftAnti => "leftanti",
            JoinKind::RightSemi => "rightsemi",
        })
    }
}

/// `where predicate`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WhereOp {
    /// The filter predicate.
    pub predicate: Expr,
    /// Source span.
    pub span: Span,
}

/// `project col, col, ...`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectOp {
    /// The projected columns, in order.
    pub columns: Vec<ProjectColumn>,
    /// Source span.
    pub span: Span,
}

/// `extend name = expr, ...`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtendOp {
    /// The new column assignments, in order.
    pub assignments: Vec<ExtendAssignment>,
    /// Source span.
    pub span: Span,
}

/// `summarize agg, ... [by expr, ...]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SummarizeOp {
    /// The aggregations, in order.
    pub aggregations: Vec<Aggregation>,
    /// Optional group-by expressions.
    pub by: Option<Vec<Expr>>,
    /// Source span.
    pub span: Span,
}

/// `order by sortExpr, ...`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderOp {
    /// The sort keys, in priority order.
    pub order_by: Vec<SortExpr>,
    /// Source span.
    pub span: Span,
}

/// `top count [by sortExpr, ...]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopOp {
    /// The row count to keep.
    pub count: Expr,
    /// Optional tie-breaking sort keys.
    pub by: Option<Vec<SortExpr>>,
    /// Source span.
    pub span: Span,
}

/// `limit count`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LimitOp {
    /// The row count to keep.
    pub count: Expr,
    /// Source span.
    pub span: Span,
}

/// `distinct [expr, ...]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistinctOp {
    /// The columns to distinct by; `None` means "all columns".
    pub columns: Option<Vec<Expr>>,
    /// Source span.
    pub span: Span,
}

/// `join [inner|left|right|full|leftanti|rightsemi] table on expr`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinOp {
    /// The join kind; defaults to [`JoinKind::Inner`] when unspecified.
    pub kind: JoinKind,
    /// The joined table.
    pub table: TableExpression,
    /// The join predicate.
    pub on: Expr,
    /// Source span.
    pub span: Span,
}

/// `union table, table, ...`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnionOp {
    /// The unioned tables, in order.
    pub tables: Vec<TableExpression>,
    /// Source span.
    pub span: Span,
}

/// The closed set of post-pipe operations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operation {
    /// `where`
    Where(WhereOp),
    /// `project`
    Project(ProjectOp),
    /// `extend`
    Extend(ExtendOp),
    /// `summarize`
    Summarize(SummarizeOp),
    /// `order by`
    Order(OrderOp),
    /// `top`
    Top(TopOp),
    /// `limit`
    Limit(LimitOp),
    /// `distinct`
    Distinct(DistinctOp),
    /// `join`
    Join(Box<JoinOp>),
    /// `union`
    Union(UnionOp),
}

impl Operation {
    /// The span covering this operation's full source text.
    pub fn span(&self) -> Span {
        match self {
            Operation::Where(op) => op.span,
            Operation::Project(op) => op.span,
            Operation::Extend(op) => op.span,
            Operation::Summarize(op) => op.span,
            Operation::Order(op) => op.span,
            Operation::Top(op) => op.span,
            Operation::Limit(op) => op.span,
            Operation::Distinct(op) => op.span,
            Operation::Join(op) => op.span,
            Operation::Union(op) => op.span,
        }
    }

    /// A short keyword-style name for this operation kind, used by the
    /// optimizer's cost model and in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operation::Where(_) => "where",
            Operation::Project(_) => "project",
            Operation::Extend(_) => "extend",
            Operation::Summarize(_) => "summarize",
            Operation::Order(_) => "order",
            Operation::Top(_) => "top",
            Operation::Limit(_) => "limit",
            Operation::Distinct(_) => "distinct",
            Operation::Join(_) => "join",
            Operation::Union(_) => "union",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Where(op) => write!(f, "where {}", op.predicate),
            Operation::Project(op) => {
                write!(f, "project {}", display_comma_separated(&op.columns))
            }
            Operation::Extend(op) => {
                write!(f, "extend {}", display_comma_separated(&op.assignments))
            }
            Operation::Summarize(op) => {
                write!(f, "summarize {}", display_comma_separated(&op.aggregations))?;
                if let Some(by) = &op.by {
                    write!(f, " by {}", display_comma_separated(by))?;
                }
                Ok(())
            }
            Operation::Order(op) => write!(f, "order by {}", display_comma_separated(&op.order_by)),
            Operation::Top(op) => {
                write!(f, "top {}", op.count)?;
                if let Some(by) = &op.by {
                    write!(f, " by {}", display_comma_separated(by))?;
                }
                Ok(())
            }
            Operation::Limit(op) => write!(f, "limit {}", op.count),
            Operation::Distinct(op) => {
                f.write_str("distinct")?;
                if let Some(columns) = &op.columns {
                    write!(f, " {}", display_comma_separated(columns))?;
                }
                Ok(())
            }
            Operation::Join(op) => {
                write!(f, "join {} {} on {}", op.kind, op.table, op.on)
            }
            Operation::Union(op) => write!(f, "union {}", display_comma_separated(&op.tables)),
        }
    }
}
