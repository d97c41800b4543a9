//! # kql-common
//!
//! kql-common holds the types shared by every other crate in the KQL query
//! engine: source spans, the read-only schema catalog, execution-plan
//! records, the per-query execution context, and the trait contracts for
//! the backends the engine is handed (connection pool, cache) rather than
//! owns.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod backend;
mod catalog;
mod context;
mod plan;
mod span;

pub use self::{
    backend::{ConnectionPool, QueryCache, SqlClient},
    catalog::{
        ColumnSchema, DataTypeName, FunctionCategory, FunctionSchema, KeywordCategory,
        KeywordSchema, OperatorSchema, ParamSchema, SchemaCatalog, TableSchema,
    },
    context::{ExecutionContext, TimeRange},
    plan::{ExecutionPlan, OptimizationApplied, PlanStep},
    span::Span,
};
