//! End-to-end scenarios against the full tokenize -> parse -> optimize
//! -> generate pipeline, plus the cross-cutting property checks that
//! aren't already exercised by a single crate's unit tests.

use kql_common::{ExecutionContext, TimeRange};
use kql_engine::{Engine, EngineConfig};
use kql_searchgen::{QueryNode, SearchValue};

fn engine() -> Engine {
    Engine::new(EngineConfig::default())
}

fn context() -> ExecutionContext {
    ExecutionContext::new("org1")
}

#[test]
fn scenario_1_where_equality_binds_tenant_then_predicate() {
    let output = engine().compile_sql("logs | where severity == \"high\"", &context()).unwrap();
    assert_eq!(output.params, vec!["org1", "high"]);
    assert!(output.sql.contains("WHERE organization_id = $1"));
    assert!(output.sql.contains("\"severity\" = $2"));

    let explain = engine().explain_query("logs | where severity == \"high\"", &context()).unwrap();
    assert_eq!(explain.plan.steps[0].op_name, "TableScan");
    assert!(explain.estimated_rows <= explain.plan.steps[0].est_rows);
}

#[test]
fn scenario_2_sequential_wheres_combine_into_one() {
    let output = engine().compile_sql("logs | where a == 1 | where b == 2", &context()).unwrap();
    assert_eq!(output.params, vec!["org1", "1", "2"]);
    assert_eq!(output.sql.matches("WHERE").count(), 2, "base scope + one combined predicate, no second WHERE");
    assert!(output.sql.contains("\"a\" = $2 AND \"b\" = $3"));
}

#[test]
fn scenario_3_summarize_by_groups_and_counts() {
    // written as `count() as c` rather than `c=count()`: the grammar only
    // accepts a trailing `as alias` on an aggregation, not `alias = func()`.
    let output = engine()
        .compile_sql("logs | summarize count() as c by severity", &context())
        .unwrap();
    assert_eq!(output.params, vec!["org1"]);
    assert!(output.sql.contains("COUNT(*) AS \"c\""));
    assert!(output.sql.contains("GROUP BY \"severity\""));
}

#[test]
fn scenario_4_ago_literal_and_top_by_desc() {
    let output = engine()
        .compile_sql("logs | where ts > ago(1h) | top 10 by ts desc", &context())
        .unwrap();
    assert_eq!(output.params[0], "org1");
    assert_eq!(output.params[1], "1 hour");
    // `ago(interval)` lowers to a wall-clock subtraction, not AGE() --
    // AGE() takes timestamp arguments, not a bare interval.
    assert!(output.sql.contains("\"ts\" > (NOW() - $2::interval)"));
    assert!(output.sql.contains("ORDER BY \"ts\" DESC"));
    assert!(output.sql.contains("LIMIT $3"));
    assert_eq!(output.params[2], "10");
}

#[test]
fn scenario_5_project_with_alias() {
    let output = engine().compile_sql("logs | project user as u, severity", &context()).unwrap();
    assert_eq!(output.params, vec!["org1"]);
    assert!(output.sql.contains("\"user\" AS \"u\""));
    assert!(output.sql.contains("\"severity\""));
}

#[test]
fn scenario_6_search_dsl_from_equality_and_contains() {
    let output = engine()
        .compile_search("logs | where EventID == 4625 and User contains \"admin\"")
        .unwrap();
    match output.query.unwrap() {
        QueryNode::Bool(b) => {
            assert_eq!(b.must.len(), 2);
            assert_eq!(
                b.must[0],
                QueryNode::Term { field: "event_id".into(), value: SearchValue::Number("4625".into()) }
            );
            assert_eq!(
                b.must[1],
                QueryNode::Wildcard { field: "user.name".into(), pattern: "*admin*".into() }
            );
        }
        other => panic!("expected a bool/must query, got {:?}", other),
    }
}

#[test]
fn execution_context_time_range_and_row_cap_both_apply() {
    let mut ctx = context();
    ctx.time_range = Some(TimeRange { start: "2026-01-01T00:00:00Z".into(), end: "2026-02-01T00:00:00Z".into() });
    ctx.max_rows = Some(100);
    let output = engine().compile_sql("logs", &ctx).unwrap();
    assert_eq!(output.params[0], "org1");
    assert_eq!(output.params[1], "2026-01-01T00:00:00Z");
    assert_eq!(output.params[2], "2026-02-01T00:00:00Z");
    assert_eq!(output.params[3], "100");
    assert!(output.sql.contains("timestamp BETWEEN $2 AND $3"));
    assert!(output.sql.contains("LIMIT $4"));
}

#[test]
fn property_round_trip_span_integrity() {
    let source = "logs | where severity == \"high\" | project severity";
    let (tokens, errors) = engine().tokenize(source);
    assert!(errors.is_empty());
    for token in &tokens {
        let start = token.span.start as usize;
        let end = token.span.end as usize;
        assert_eq!(token.lexeme, source[start..end]);
    }
}

#[test]
fn property_parse_format_parse_is_idempotent() {
    let source = "logs | where severity == \"high\" | top 10 by severity desc";
    let (program, errors) = engine().parse(source);
    assert!(errors.is_empty());
    let program = program.unwrap();
    let rendered = program.to_string();
    let (reparsed, errors2) = engine().parse(&rendered);
    assert!(errors2.is_empty());
    assert_eq!(program, reparsed.unwrap());
}

#[test]
fn property_parameter_balance_matches_placeholder_count() {
    let output = engine()
        .compile_sql("logs | where a == 1 | where b == 2", &context())
        .unwrap();
    let placeholder_count = (1..=output.params.len())
        .filter(|n| output.sql.contains(&format!("${}", n)))
        .count();
    assert_eq!(placeholder_count, output.params.len());
}

#[test]
fn property_tenant_isolation_is_always_the_first_parameter() {
    for source in ["logs", "logs | where a == 1", "logs | summarize count() as c by severity"] {
        let output = engine().compile_sql(source, &context()).unwrap();
        assert_eq!(output.params[0], "org1");
        assert!(output.sql.contains("WHERE organization_id = $1"));
    }
}

#[test]
fn property_optimizer_preserves_column_identifiers_across_combination() {
    let before = engine().parse("logs | where a == 1 | where b == 2").0.unwrap();
    let (optimized, _plan) = kql_optimize::optimize(before.query.clone());
    let mut before_cols: Vec<String> = Vec::new();
    collect_identifiers(&before.query, &mut before_cols);
    let mut after_cols: Vec<String> = Vec::new();
    collect_identifiers_in_query(&optimized, &mut after_cols);
    before_cols.sort();
    after_cols.sort();
    assert_eq!(before_cols, after_cols);
}

#[test]
fn property_completion_set_only_grows_as_a_table_name_prefix_lengthens() {
    let mut catalog = kql_common::SchemaCatalog::new();
    catalog.add_table(kql_common::TableSchema { name: "StormEvents".into(), columns: Vec::new(), sample_queries: Vec::new() });
    catalog.add_table(kql_common::TableSchema { name: "StormAlerts".into(), columns: Vec::new(), sample_queries: Vec::new() });

    let shorter = engine().get_completions("Storm", 5, None, &catalog);
    let longer = engine().get_completions("StormE", 6, None, &catalog);
    let longer_labels: Vec<&str> = longer.iter().map(|i| i.label.as_str()).collect();
    for item in &shorter {
        if item.label == "StormEvents" {
            assert!(longer_labels.contains(&"StormEvents"));
        }
    }
    assert!(longer_labels.contains(&"StormEvents"));
    assert!(!longer_labels.contains(&"StormAlerts"));
}

fn collect_identifiers(query: &kql_ast::Query, out: &mut Vec<String>) {
    collect_identifiers_in_query(query, out)
}

fn collect_identifiers_in_query(query: &kql_ast::Query, out: &mut Vec<String>) {
    for op in &query.operations {
        if let kql_ast::Operation::Where(where_op) = op {
            collect_identifiers_in_expr(&where_op.predicate, out);
        }
    }
}

fn collect_identifiers_in_expr(expr: &kql_ast::Expr, out: &mut Vec<String>) {
    match expr {
        kql_ast::Expr::Identifier(ident) => out.push(ident.name.clone()),
        kql_ast::Expr::Binary(binary) => {
            collect_identifiers_in_expr(&binary.left, out);
            collect_identifiers_in_expr(&binary.right, out);
        }
        kql_ast::Expr::Unary(unary) => collect_identifiers_in_expr(&unary.expr, out),
        _ => {}
    }
}
