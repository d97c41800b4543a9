#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single step of an execution plan, produced by the optimizer for one
/// pipeline operation (or the implicit base table scan).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanStep {
    /// The operation name, e.g. `TableScan`, `Where`, `Summarize`.
    pub op_name: String,
    /// A human-readable description of what this step does.
    pub description: String,
    /// Estimated row count flowing out of this step.
    pub est_rows: u64,
    /// Estimated relative cost of this step.
    pub est_cost: f64,
    /// Position of this step in the plan, starting at 0 for the table scan.
    pub index: usize,
}

/// A record of one optimization rule having been considered.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationApplied {
    /// Stable identifier of the rule, e.g. `predicate_combination`.
    pub kind: String,
    /// Human-readable description of what the rule did (or would have
    /// done, if `applied` is false).
    pub description: String,
    /// A rough estimate of the improvement, in `[0.0, 1.0]`.
    pub estimated_improvement: f64,
    /// Whether the rule actually rewrote the AST. `false` only for the
    /// dead-code-elimination stub (see optimizer docs).
    pub applied: bool,
}

/// The full execution plan produced by the optimizer: an ordered sequence
/// of steps, a total cost, and the list of optimizations considered.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExecutionPlan {
    /// Ordered plan steps, starting with the base table scan.
    pub steps: Vec<PlanStep>,
    /// Sum of every step's estimated cost.
    pub total_cost: f64,
    /// Optimization rules considered during planning, in application order.
    pub optimizations: Vec<OptimizationApplied>,
}

impl ExecutionPlan {
    /// The estimated row count of the final step, or 0 for an empty plan.
    pub fn estimated_rows(&self) -> u64 {
        self.steps.last().map(|s| s.est_rows).unwrap_or(0)
    }
}
