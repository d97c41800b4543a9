//! # kql-complete
//!
//! A context-sensitive completion provider over an in-memory schema
//! catalog. Re-lexes the source up to the cursor (reusing
//! [`kql_lexer::Lexer`] directly rather than maintaining a separate
//! incremental lexer), classifies the cursor's position into one of a
//! closed set of contexts, and ranks the resulting candidates. Fully
//! synchronous: no I/O, no suspension points.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec::Vec};

mod context;
mod item;
mod rank;

pub use self::context::{current_table, CompletionContext};
pub use self::item::{CompletionItem, CompletionItemKind};

use kql_common::{DataTypeName, FunctionCategory, FunctionSchema, SchemaCatalog};
use kql_lexer::TokenKind;
use rank::{rank, Candidate};

/// Fixed example timespan literals offered inside a `timespan`-typed
/// function argument; the catalog carries no enumerable timespan
/// domain to draw from.
const TIMESPAN_EXAMPLES: &[&str] = &["5m", "30m", "1h", "1d", "7d", "30d"];

fn data_type_label(data_type: DataTypeName) -> &'static str {
    match data_type {
        DataTypeName::String => "string",
        DataTypeName::Number => "number",
        DataTypeName::Boolean => "bool",
        DataTypeName::DateTime => "datetime",
        DataTypeName::Timespan => "timespan",
        DataTypeName::Guid => "guid",
        DataTypeName::Dynamic => "dynamic",
    }
}

fn format_signature(function: &FunctionSchema) -> String {
    let params: Vec<String> = function.params.iter().map(|p| p.name.clone()).collect();
    format!("{}({}) -> {}", function.name, params.join(", "), data_type_label(function.return_type))
}

fn column_candidates(table: Option<&str>, catalog: &SchemaCatalog) -> Vec<Candidate> {
    let Some(table) = table.and_then(|name| catalog.table(name)) else {
        return Vec::new();
    };
    table
        .columns
        .iter()
        .map(|column| Candidate {
            label: column.name.clone(),
            kind: CompletionItemKind::Column,
            detail: Some(data_type_label(column.data_type).into()),
            doc: column.description.clone(),
            insert_text: None,
        })
        .collect()
}

fn function_candidates(category: FunctionCategory, catalog: &SchemaCatalog) -> Vec<Candidate> {
    catalog
        .functions_by_category(category)
        .map(|function| Candidate {
            label: function.name.clone(),
            kind: if category == FunctionCategory::Aggregation {
                CompletionItemKind::Command
            } else {
                CompletionItemKind::Function
            },
            detail: Some(format_signature(function)),
            doc: function.examples.first().cloned(),
            insert_text: Some(format!("{}(", function.name)),
        })
        .collect()
}

fn operator_candidates(catalog: &SchemaCatalog) -> Vec<Candidate> {
    catalog
        .operators()
        .map(|operator| Candidate {
            label: operator.op.clone(),
            kind: CompletionItemKind::Operator,
            detail: Some(format!(
                "{} {} {} -> {}",
                data_type_label(operator.left_type),
                operator.op,
                data_type_label(operator.right_type),
                data_type_label(operator.return_type)
            )),
            doc: Some(operator.description.clone()),
            insert_text: None,
        })
        .collect()
}

fn command_keyword_candidates(catalog: &SchemaCatalog) -> Vec<Candidate> {
    catalog
        .keywords()
        .filter(|kw| kw.category == kql_common::KeywordCategory::Command)
        .map(|kw| Candidate {
            label: kw.keyword.clone(),
            kind: CompletionItemKind::Command,
            detail: None,
            doc: Some(kw.description.clone()),
            insert_text: None,
        })
        .collect()
}

fn all_keyword_candidates(catalog: &SchemaCatalog) -> Vec<Candidate> {
    catalog
        .keywords()
        .map(|kw| Candidate {
            label: kw.keyword.clone(),
            kind: CompletionItemKind::Keyword,
            detail: None,
            doc: Some(kw.description.clone()),
            insert_text: None,
        })
        .collect()
}

fn table_candidates(catalog: &SchemaCatalog) -> Vec<Candidate> {
    catalog
        .tables()
        .map(|table| Candidate {
            label: table.name.clone(),
            kind: CompletionItemKind::Table,
            detail: None,
            doc: table.sample_queries.first().cloned(),
            insert_text: None,
        })
        .collect()
}

/// Type-directed suggestions for the argument at `param_index` of
/// `function_name`. Falls back to table columns plus scalar functions
/// when the function or its parameter metadata isn't known, since
/// *some* suggestion is better than none inside an open call.
fn function_call_candidates(
    function_name: &str,
    param_index: usize,
    table: Option<&str>,
    catalog: &SchemaCatalog,
) -> Vec<Candidate> {
    let param = catalog.function(function_name).and_then(|f| f.params.get(param_index));
    match param {
        Some(param) if param.data_type == DataTypeName::Timespan => TIMESPAN_EXAMPLES
            .iter()
            .map(|example| Candidate {
                label: (*example).into(),
                kind: CompletionItemKind::Literal,
                detail: Some("timespan".into()),
                doc: None,
                insert_text: None,
            })
            .collect(),
        Some(param) if param.name.eq_ignore_ascii_case("column") => column_candidates(table, catalog),
        _ => {
            let mut candidates = column_candidates(table, catalog);
            candidates.extend(function_candidates(FunctionCategory::Scalar, catalog));
            candidates
        }
    }
}

/// The partial word touching the cursor, used to prefix-filter
/// candidates; empty when the cursor follows whitespace or punctuation.
fn partial_word(prefix: &str, tokens: &[kql_lexer::Token]) -> String {
    match tokens.last() {
        Some(token) if token.span.end as usize == prefix.len() => match &token.kind {
            TokenKind::Ident(name) => name.clone(),
            TokenKind::QuotedIdent(name) => name.clone(),
            TokenKind::Keyword(kw) => kw.as_str().to_lowercase(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Produces ranked completion suggestions for the cursor at byte offset
/// `cursor` within `text`, against `catalog`.
///
/// `cursor` must fall on a UTF-8 character boundary; the prefix
/// `text[0..cursor)` is re-lexed independently of any surrounding
/// parse, tolerating lexical errors in exactly the way a compile pass
/// would not.
pub fn get_completions(text: &str, cursor: usize, catalog: &SchemaCatalog) -> Vec<CompletionItem> {
    let prefix = &text[..cursor];
    let (raw_tokens, _errors) = kql_lexer::tokenize(prefix);
    let tokens: Vec<kql_lexer::Token> =
        raw_tokens.into_iter().filter(|t| !t.is_trivia() && !matches!(t.kind, TokenKind::Eof)).collect();

    let partial = partial_word(prefix, &tokens);
    let ctx = context::classify(&tokens, catalog);

    let candidates = match &ctx {
        CompletionContext::FunctionCall { function_name, param_index } => {
            let table = current_table(&tokens, catalog);
            function_call_candidates(function_name, *param_index, table.as_deref(), catalog)
        }
        CompletionContext::AtBeginning => table_candidates(catalog),
        CompletionContext::AfterPipe => command_keyword_candidates(catalog),
        CompletionContext::InsideWhere { table } => {
            let mut candidates = column_candidates(table.as_deref(), catalog);
            candidates.extend(operator_candidates(catalog));
            candidates.extend(function_candidates(FunctionCategory::Scalar, catalog));
            candidates
        }
        CompletionContext::InsideProject { table } => {
            let mut candidates = column_candidates(table.as_deref(), catalog);
            candidates.extend(function_candidates(FunctionCategory::Scalar, catalog));
            candidates
        }
        CompletionContext::InsideSummarize { table } => {
            let mut candidates = function_candidates(FunctionCategory::Aggregation, catalog);
            candidates.extend(column_candidates(table.as_deref(), catalog));
            candidates
        }
        CompletionContext::Fallback { table } => {
            let mut candidates = all_keyword_candidates(catalog);
            candidates.extend(column_candidates(table.as_deref(), catalog));
            candidates.extend(function_candidates(FunctionCategory::Scalar, catalog));
            candidates
        }
    };

    rank(candidates, &partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_common::{ColumnSchema, OperatorSchema, TableSchema};

    fn catalog() -> SchemaCatalog {
        let mut catalog = SchemaCatalog::new();
        catalog.add_table(TableSchema {
            name: "StormEvents".into(),
            columns: vec![
                ColumnSchema {
                    name: "Severity".into(),
                    data_type: DataTypeName::String,
                    nullable: false,
                    description: None,
                    examples: Vec::new(),
                },
                ColumnSchema {
                    name: "State".into(),
                    data_type: DataTypeName::String,
                    nullable: false,
                    description: None,
                    examples: Vec::new(),
                },
            ],
            sample_queries: Vec::new(),
        });
        catalog.add_operator(OperatorSchema {
            op: "==".into(),
            left_type: DataTypeName::String,
            right_type: DataTypeName::String,
            return_type: DataTypeName::Boolean,
            description: "equality".into(),
        });
        catalog
    }

    #[test]
    fn at_beginning_suggests_tables() {
        let catalog = catalog();
        let items = get_completions("Storm", 5, &catalog);
        assert_eq!(items[0].label, "StormEvents");
        assert_eq!(items[0].kind, CompletionItemKind::Table);
    }

    #[test]
    fn inside_where_suggests_columns_and_operators() {
        let catalog = catalog();
        let text = "StormEvents | where Sev";
        let items = get_completions(text, text.len(), &catalog);
        assert!(items.iter().any(|i| i.label == "Severity" && i.kind == CompletionItemKind::Column));
    }

    #[test]
    fn exact_column_match_sorts_first_among_columns() {
        let catalog = catalog();
        let text = "StormEvents | where State";
        let items = get_completions(text, text.len(), &catalog);
        let columns: Vec<_> = items.iter().filter(|i| i.kind == CompletionItemKind::Column).collect();
        assert_eq!(columns[0].label, "State");
    }
}
