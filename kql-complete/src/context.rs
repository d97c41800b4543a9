#[cfg(not(feature = "std"))]
use alloc::string::String;

use kql_common::SchemaCatalog;
use kql_lexer::{Keyword, Token, TokenKind};

/// The cursor's classified position, in the priority order the contract
/// names them. Each variant except [`CompletionContext::FunctionCall`]
/// carries the `current_table` resolved from the prefix, when one could
/// be determined.
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionContext {
    /// Cursor sits inside an unclosed call's argument list.
    FunctionCall {
        /// The function being called.
        function_name: String,
        /// Zero-based index of the argument the cursor is in.
        param_index: usize,
    },
    /// No `|` yet in the prefix, and at most one word typed so far.
    AtBeginning,
    /// The segment after the last `|` is empty or a single partial word.
    AfterPipe,
    /// Cursor is inside a `where` clause's predicate.
    InsideWhere {
        /// The table this predicate filters, if resolved.
        table: Option<String>,
    },
    /// Cursor is inside a `project` clause's column list.
    InsideProject {
        /// The table these columns come from, if resolved.
        table: Option<String>,
    },
    /// Cursor is inside a `summarize` clause.
    InsideSummarize {
        /// The table being summarized, if resolved.
        table: Option<String>,
    },
    /// None of the above matched.
    Fallback {
        /// The table in scope, if resolved.
        table: Option<String>,
    },
}

/// Resolves the table the cursor is currently working against: the
/// first identifier that names a known table, looked for either at the
/// very start of the token stream or immediately after a `|`.
pub fn current_table(tokens: &[Token], catalog: &SchemaCatalog) -> Option<String> {
    if let Some(Token { kind: TokenKind::Ident(name), .. }) = tokens.first() {
        if catalog.table(name).is_some() {
            return Some(name.clone());
        }
    }
    for pair in tokens.windows(2) {
        if let [before, after] = pair {
            if matches!(before.kind, TokenKind::Pipe) {
                if let TokenKind::Ident(name) = &after.kind {
                    if catalog.table(name).is_some() {
                        return Some(name.clone());
                    }
                }
            }
        }
    }
    None
}

/// Scans `tokens` right-to-left for an unmatched `(` immediately
/// preceded by an identifier, returning that function's name and the
/// argument index the cursor sits at (the number of depth-0 commas
/// between the `(` and the cursor).
fn function_call_context(tokens: &[Token]) -> Option<(String, usize)> {
    let mut depth: i32 = 0;
    let mut commas = 0usize;
    let mut i = tokens.len();
    while i > 0 {
        i -= 1;
        match &tokens[i].kind {
            TokenKind::RightParen => depth += 1,
            TokenKind::LeftParen => {
                if depth == 0 {
                    return match i.checked_sub(1).and_then(|j| tokens.get(j)) {
                        Some(Token { kind: TokenKind::Ident(name), .. }) => Some((name.clone(), commas)),
                        _ => None,
                    };
                }
                depth -= 1;
            }
            TokenKind::Comma if depth == 0 => commas += 1,
            _ => {}
        }
    }
    None
}

/// The token slice after the last `|`, or the whole stream if there is
/// none.
fn last_segment(tokens: &[Token]) -> &[Token] {
    match tokens.iter().rposition(|t| matches!(t.kind, TokenKind::Pipe)) {
        Some(idx) => &tokens[idx + 1..],
        None => tokens,
    }
}

/// Classifies the cursor context from the non-trivia tokens of
/// `text[0..cursor)`, in the priority order the contract specifies.
pub fn classify(tokens: &[Token], catalog: &SchemaCatalog) -> CompletionContext {
    if let Some((function_name, param_index)) = function_call_context(tokens) {
        return CompletionContext::FunctionCall { function_name, param_index };
    }

    let has_pipe = tokens.iter().any(|t| matches!(t.kind, TokenKind::Pipe));
    if !has_pipe && tokens.len() <= 1 {
        return CompletionContext::AtBeginning;
    }

    let segment = last_segment(tokens);
    if has_pipe && segment.len() <= 1 {
        return CompletionContext::AfterPipe;
    }

    let table = current_table(tokens, catalog);
    match segment.first().map(|t| &t.kind) {
        Some(TokenKind::Keyword(Keyword::Where)) => CompletionContext::InsideWhere { table },
        Some(TokenKind::Keyword(Keyword::Project)) => CompletionContext::InsideProject { table },
        Some(TokenKind::Keyword(Keyword::Summarize)) => CompletionContext::InsideSummarize { table },
        _ => CompletionContext::Fallback { table },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_common::TableSchema;

    fn catalog_with_table(name: &str) -> SchemaCatalog {
        let mut catalog = SchemaCatalog::new();
        catalog.add_table(TableSchema { name: name.into(), columns: Vec::new(), sample_queries: Vec::new() });
        catalog
    }

    fn lex(source: &str) -> Vec<Token> {
        let (tokens, _) = kql_lexer::Lexer::new(source).tokenize();
        tokens.into_iter().filter(|t| !t.is_trivia() && !matches!(t.kind, TokenKind::Eof)).collect()
    }

    #[test]
    fn empty_prefix_classifies_as_at_beginning() {
        let catalog = SchemaCatalog::new();
        assert_eq!(classify(&lex(""), &catalog), CompletionContext::AtBeginning);
    }

    #[test]
    fn a_single_partial_table_word_is_still_at_beginning() {
        let catalog = SchemaCatalog::new();
        assert_eq!(classify(&lex("Sto"), &catalog), CompletionContext::AtBeginning);
    }

    #[test]
    fn right_after_a_pipe_with_nothing_typed_yet() {
        let catalog = SchemaCatalog::new();
        assert_eq!(classify(&lex("StormEvents | "), &catalog), CompletionContext::AfterPipe);
    }

    #[test]
    fn inside_where_resolves_the_current_table() {
        let catalog = catalog_with_table("StormEvents");
        let ctx = classify(&lex("StormEvents | where Sev"), &catalog);
        assert_eq!(ctx, CompletionContext::InsideWhere { table: Some("StormEvents".into()) });
    }

    #[test]
    fn inside_an_unclosed_call_reports_the_function_and_argument_index() {
        let catalog = SchemaCatalog::new();
        let ctx = classify(&lex("StormEvents | where strlen(State) > ago("), &catalog);
        assert_eq!(ctx, CompletionContext::FunctionCall { function_name: "ago".into(), param_index: 0 });
    }

    #[test]
    fn a_second_argument_reports_param_index_one() {
        let catalog = SchemaCatalog::new();
        let ctx = classify(&lex("T | extend x = strcat(a, "), &catalog);
        assert_eq!(ctx, CompletionContext::FunctionCall { function_name: "strcat".into(), param_index: 1 });
    }
}
