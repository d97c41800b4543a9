#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use kql_ast::{LetStmt, Program, Query};
use kql_common::Span;
use kql_lexer::{Keyword, TokenKind};

use crate::{error::ParseError, parser::Parser};

impl Parser {
    /// Parses `(letStmt ';')* query`, the top-level production. Errors if
    /// any token remains unconsumed afterward -- a dangling suffix (e.g. an
    /// operation the grammar doesn't recognize) is a syntax error, not a
    /// silently truncated parse.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut lets = Vec::new();
        while self.peek_token().map(|t| t.is_keyword(Keyword::Let)) == Some(true) {
            lets.push(self.parse_let_stmt()?);
            self.expect_token(&TokenKind::SemiColon)?;
        }
        let query = self.parse_query()?;
        self.expect_token(&TokenKind::Eof)?;
        Ok(Program { lets, query })
    }

    fn parse_let_stmt(&mut self) -> Result<LetStmt, ParseError> {
        let start = self.current_offset();
        self.expect_keyword(Keyword::Let)?;
        let name = self.expect_ident()?;
        self.expect_token(&TokenKind::Assign)?;
        let expr = self.parse_expr()?;
        let span = Span::new(start, expr.span().end);
        Ok(LetStmt { name, expr, span })
    }

    /// Parses `tableExpr ('|' operation)*`.
    pub fn parse_query(&mut self) -> Result<Query, ParseError> {
        let start = self.current_offset();
        let table = self.parse_table_expr()?;
        let mut operations = Vec::new();
        while self.next_token_if_is(&TokenKind::Pipe) {
            operations.push(self.parse_operation()?);
        }
        let span = Span::new(start, self.current_offset().max(start));
        Ok(Query {
            table,
            operations,
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_lexer::Lexer;

    fn parse_program_str(src: &str) -> Program {
        let (tokens, errors) = Lexer::new(src).tokenize();
        assert!(errors.is_empty(), "{:?}", errors);
        let filtered = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
        let mut parser = Parser::new_with_tokens(filtered);
        parser.parse_program().unwrap()
    }

    #[test]
    fn parses_table_with_single_where() {
        let program = parse_program_str("logs | where severity == \"high\"");
        assert_eq!(program.query.table.name, "logs");
        assert_eq!(program.query.operations.len(), 1);
    }

    #[test]
    fn parses_leading_let_bindings() {
        let program = parse_program_str("let threshold = 10; logs | where count_val > threshold");
        assert_eq!(program.lets.len(), 1);
        assert_eq!(program.lets[0].name, "threshold");
    }

    #[test]
    fn parses_full_pipeline() {
        // `summarize` only accepts a trailing `as alias`, per the grammar's
        // `agg := IDENT ('(' expr? ')')? ('as' IDENT)?` -- not `alias = func()`.
        let program = parse_program_str(
            "logs | where severity == \"high\" | project user as u, severity | summarize count() as c by severity | order by c desc | top 10 by c",
        );
        assert_eq!(program.query.operations.len(), 5);
    }

    #[test]
    fn trailing_tokens_after_the_pipeline_are_a_syntax_error() {
        let (tokens, errors) = Lexer::new("logs | where a = 1").tokenize();
        assert!(errors.is_empty());
        let filtered = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
        let mut parser = Parser::new_with_tokens(filtered);
        assert!(parser.parse_program().is_err());
    }

    #[test]
    fn parses_join_with_alias_and_kind() {
        let program = parse_program_str("logs | join left users u on logs.user_id == u.id");
        assert_eq!(program.query.operations.len(), 1);
    }

    #[test]
    fn parses_union_of_multiple_tables() {
        let program = parse_program_str("logs | union audit_logs, archived_logs");
        assert_eq!(program.query.operations.len(), 1);
    }
}
