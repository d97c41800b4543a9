//! # kql-engine
//!
//! The façade crate: wires the lexer, parser, optimizer, SQL generator,
//! search-DSL generator, and completion provider behind one entry
//! point. `Engine` itself carries only process-wide defaults
//! ([`EngineConfig`]) -- the schema catalog and any backend connection
//! pool are constructed once by the embedder and handed in by
//! reference or by generic parameter, never owned here.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec::Vec};

mod config;
mod error;

pub use self::config::EngineConfig;
pub use self::error::EngineError;

pub use kql_ast::{Program, Query};
pub use kql_common::{
    ColumnSchema, ConnectionPool, ExecutionContext, ExecutionPlan, FunctionSchema, SchemaCatalog,
    SqlClient, TableSchema, TimeRange,
};
pub use kql_complete::CompletionItem;
pub use kql_lexer::{LexError, Token};
pub use kql_parser::ParseError;
pub use kql_searchgen::SearchOutput;
pub use kql_sqlgen::{GenerationError, SqlOutput};

/// The outcome of [`Engine::validate_query`]: no AST is returned, only
/// whether the source compiles and, if not, one message per distinct
/// issue found.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationResult {
    /// Whether `source` lexes and parses with no errors.
    pub valid: bool,
    /// Human-readable messages, one per distinct lexical or syntactic
    /// problem found.
    pub errors: Vec<String>,
}

/// The outcome of [`Engine::explain_query`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExplainOutput {
    /// The optimizer's step-by-step execution plan.
    pub plan: ExecutionPlan,
    /// Estimated row count of the final step.
    pub estimated_rows: u64,
    /// Sum of every step's estimated cost.
    pub estimated_cost: f64,
}

/// Appends a bound value to `params` and returns its placeholder.
fn push_param(params: &mut Vec<String>, value: String) -> String {
    params.push(value);
    format!("${}", params.len())
}

/// Applies the two `ExecutionContext` behaviors the generated SQL itself
/// knows nothing about: a wall-clock scoping window and a row cap. Both
/// wrap the already-generated statement in one further subquery layer,
/// consistent with every operation `kql-sqlgen` itself emits, rather
/// than splicing text into an existing `WHERE` clause.
fn apply_execution_context(mut output: SqlOutput, context: &ExecutionContext) -> SqlOutput {
    if let Some(time_range) = &context.time_range {
        let start = push_param(&mut output.params, time_range.start.clone());
        let end = push_param(&mut output.params, time_range.end.clone());
        output.sql = format!(
            "(SELECT * FROM {} base WHERE timestamp BETWEEN {} AND {})",
            output.sql, start, end
        );
    }
    if let Some(max_rows) = context.max_rows {
        let limit = push_param(&mut output.params, max_rows.to_string());
        output.sql = format!("(SELECT * FROM {} base LIMIT {})", output.sql, limit);
    }
    output
}

/// Parses `source`, returning the single query the pipeline operates
/// on. `kql-parser` aborts at the first syntax error, so failure always
/// carries exactly one [`ParseError`].
fn parse_or_fail(source: &str) -> Result<kql_ast::Query, EngineError> {
    let (program, mut errors) = kql_parser::parse(source);
    match program {
        Some(program) if errors.is_empty() => Ok(program.query),
        _ => Err(EngineError::Parse(
            errors.pop().unwrap_or_else(|| ParseError::Syntax("unknown parse failure".into())),
        )),
    }
}

/// The engine façade. Cheap to construct; holds no schema catalog, no
/// cache, and no connection pool -- each is supplied by the caller at
/// the point it is needed, per the "no global state" design guidance.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Builds an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Tokenizes `source`, for tooling that wants raw tokens without
    /// parsing (e.g. syntax highlighting).
    pub fn tokenize(&self, source: &str) -> (Vec<Token>, Vec<LexError>) {
        kql_lexer::tokenize(source)
    }

    /// Parses `source` into a [`Program`], for tooling that wants the
    /// AST directly.
    pub fn parse(&self, source: &str) -> (Option<Program>, Vec<ParseError>) {
        kql_parser::parse(source)
    }

    /// Checks whether `source` lexes and parses cleanly, without
    /// generating SQL or a search query. Unlike [`Engine::parse`],
    /// aggregates every lexical error found rather than stopping at the
    /// first -- lexing never aborts, so neither does this check.
    pub fn validate_query(&self, source: &str) -> ValidationResult {
        let _span = tracing::debug_span!("validate_query").entered();
        let (_, lex_errors) = kql_lexer::tokenize(source);
        let mut errors: Vec<String> = lex_errors.iter().map(|e| e.to_string()).collect();
        if errors.is_empty() {
            let (_, parse_errors) = kql_parser::parse(source);
            errors.extend(parse_errors.iter().map(|e| e.to_string()));
        }
        tracing::trace!(phase = "parse", error_count = errors.len());
        ValidationResult { valid: errors.is_empty(), errors }
    }

    /// Parses and optimizes `source`, returning the resulting execution
    /// plan without generating SQL.
    pub fn explain_query(
        &self,
        source: &str,
        _context: &ExecutionContext,
    ) -> Result<ExplainOutput, EngineError> {
        let _span = tracing::debug_span!("explain_query").entered();
        let query = parse_or_fail(source)?;
        tracing::trace!(phase = "parse", operations = query.operations.len());
        let (_optimized, plan) = kql_optimize::optimize(query);
        tracing::trace!(phase = "optimize", steps = plan.steps.len());
        Ok(ExplainOutput {
            estimated_rows: plan.estimated_rows(),
            estimated_cost: plan.total_cost,
            plan,
        })
    }

    /// Parses, optimizes, and lowers `source` to a parameterized SQL
    /// statement scoped to `context.organization_id`, with the
    /// `time_range`/`max_rows` behaviors from `context` applied.
    pub fn compile_sql(
        &self,
        source: &str,
        context: &ExecutionContext,
    ) -> Result<SqlOutput, EngineError> {
        let _span = tracing::debug_span!("compile_sql").entered();
        let query = parse_or_fail(source)?;
        tracing::trace!(phase = "parse", operations = query.operations.len());
        let (optimized, plan) = kql_optimize::optimize(query);
        tracing::trace!(phase = "optimize", rules_applied = plan.optimizations.len());
        let output = kql_sqlgen::generate_sql(&optimized, &context.organization_id)?;
        tracing::trace!(phase = "generate_sql", param_count = output.params.len());
        Ok(apply_execution_context(output, context))
    }

    /// Parses and optimizes `source`, then lowers it to a document
    /// search query/aggregation DSL. Unlike [`Engine::compile_sql`], no
    /// `ExecutionContext` is required: document-search scoping (tenant,
    /// time range) is the embedder's responsibility to fold into the
    /// `query` tree before issuing it to the search backend.
    pub fn compile_search(&self, source: &str) -> Result<SearchOutput, EngineError> {
        let _span = tracing::debug_span!("compile_search").entered();
        let query = parse_or_fail(source)?;
        let (optimized, _plan) = kql_optimize::optimize(query);
        tracing::trace!(phase = "generate_search");
        Ok(kql_searchgen::generate_search(&optimized))
    }

    /// Produces ranked completion suggestions for the cursor at byte
    /// offset `position` within `text`, against `catalog`. `trigger` is
    /// accepted for interface symmetry with editor completion
    /// protocols but unused: classification is derived entirely from
    /// re-lexing `text[0..position)`.
    pub fn get_completions(
        &self,
        text: &str,
        position: usize,
        _trigger: Option<char>,
        catalog: &SchemaCatalog,
    ) -> Vec<CompletionItem> {
        let _span = tracing::debug_span!("complete").entered();
        let items = kql_complete::get_completions(text, position, catalog);
        tracing::trace!(phase = "complete", candidate_count = items.len());
        items
    }

    /// Compiles `source` against `context` and executes it through an
    /// already-open connection pool. The core never constructs a pool
    /// itself (out of scope); it only consumes the trait contract.
    pub fn execute_query<P: ConnectionPool>(
        &self,
        source: &str,
        context: &ExecutionContext,
        pool: &P,
    ) -> Result<Vec<<P::Client as SqlClient>::Row>, EngineError> {
        let _span = tracing::debug_span!("execute_query").entered();
        let output = self.compile_sql(source, context)?;

        let mut client = pool
            .connect()
            .map_err(|e| EngineError::execution(format!("{:?}", e)))?;
        if let Some(timeout_ms) = context.timeout_ms {
            client
                .set_statement_timeout(timeout_ms)
                .map_err(|e| EngineError::execution(format!("{:?}", e)))?;
        }
        let rows = client
            .query(&output.sql, &output.params)
            .map_err(|e| EngineError::execution(format!("{:?}", e)))?;
        tracing::trace!(phase = "execute", row_count = rows.len());
        Ok(rows)
    }

    /// Builds the stable cache key described for the cache contract:
    /// a serialization of the query text plus the parts of its context
    /// that affect the result. Building the key is the core's job;
    /// storing and evicting entries under it is the embedder's, via
    /// [`kql_common::QueryCache`].
    pub fn cache_key(&self, source: &str, context: &ExecutionContext) -> String {
        format!(
            "{}::{}::{:?}::{:?}::{:?}",
            source, context.organization_id, context.time_range, context.max_rows, context.timeout_ms
        )
    }

    /// All tables registered in `catalog`.
    pub fn tables<'a>(&self, catalog: &'a SchemaCatalog) -> impl Iterator<Item = &'a TableSchema> {
        catalog.tables()
    }

    /// The columns of `table` in `catalog`, if it is registered.
    pub fn columns<'a>(&self, catalog: &'a SchemaCatalog, table: &str) -> Option<&'a [ColumnSchema]> {
        catalog.table(table).map(|t| t.columns.as_slice())
    }

    /// All functions registered in `catalog`.
    pub fn functions<'a>(&self, catalog: &'a SchemaCatalog) -> impl Iterator<Item = &'a FunctionSchema> {
        catalog.functions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default())
    }

    #[test]
    fn compile_sql_binds_the_tenant_as_the_first_parameter() {
        let context = ExecutionContext::new("org1");
        let output = engine().compile_sql("logs | where severity == \"high\"", &context).unwrap();
        assert_eq!(output.params[0], "org1");
        assert!(output.sql.contains("WHERE organization_id = $1"));
    }

    #[test]
    fn compile_sql_applies_time_range_and_max_rows() {
        let mut context = ExecutionContext::new("org1");
        context.time_range = Some(TimeRange { start: "2026-01-01T00:00:00Z".into(), end: "2026-02-01T00:00:00Z".into() });
        context.max_rows = Some(500);
        let output = engine().compile_sql("logs", &context).unwrap();
        assert!(output.sql.contains("BETWEEN $2 AND $3"));
        assert!(output.sql.contains("LIMIT $4"));
        assert_eq!(output.params[3], "500");
    }

    #[test]
    fn validate_query_reports_a_syntax_error() {
        let result = engine().validate_query("logs | where");
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn validate_query_accepts_a_well_formed_pipeline() {
        let result = engine().validate_query("logs | where severity == \"high\" | project severity");
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn explain_query_starts_with_a_table_scan() {
        let context = ExecutionContext::new("org1");
        let explain = engine().explain_query("logs | where a == 1", &context).unwrap();
        assert_eq!(explain.plan.steps[0].op_name, "TableScan");
    }

    #[test]
    fn compile_search_builds_a_bool_query_from_where() {
        let output = engine().compile_search("logs | where severity == \"high\"").unwrap();
        assert!(output.query.is_some());
    }
}
