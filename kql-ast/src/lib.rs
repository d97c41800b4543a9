//! # kql-ast
//!
//! Typed AST node definitions for the KQL query engine: expressions,
//! the nine post-pipe operations, and the top-level query/program
//! shape. A closed tagged-variant hierarchy throughout, so adding a new
//! operation or expression kind is a compile error until every `match`
//! over it is updated.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod expr;
mod operation;
mod query;
mod utils;

pub use self::{expr::*, operation::*, query::*};
