//! # kql-parser
//!
//! A recursive-descent parser over the token stream produced by
//! `kql-lexer`, building the typed tree defined in `kql-ast`. Parsing
//! aborts at the first syntax error -- there is no error-recovery mode --
//! so a failed parse surfaces exactly one [`ParseError`].

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

mod error;
mod parser;
mod peek;

pub use self::{error::ParseError, parser::Parser};

use kql_ast::Program;

/// Parses `source` into a [`Program`]. On success returns `(Some(program),
/// vec![])`; on failure returns `(None, vec![error])` -- in practice the
/// returned list always holds exactly one entry, since the parser aborts
/// the whole production at its first syntax error rather than recovering
/// and continuing. The list shape mirrors `validate_query`'s contract of
/// "query is null, errors is non-empty" without special-casing the single-
/// error case at the call site.
pub fn parse(source: &str) -> (Option<Program>, Vec<ParseError>) {
    match Parser::new_with_source(source) {
        Ok(mut parser) => match parser.parse_program() {
            Ok(program) => (Some(program), Vec::new()),
            Err(err) => (None, vec![err]),
        },
        Err(err) => (None, vec![err]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_pipeline() {
        let (program, errors) = parse("logs | where severity == \"high\" | project user, severity");
        assert!(errors.is_empty());
        let program = program.unwrap();
        assert_eq!(program.query.table.name, "logs");
        assert_eq!(program.query.operations.len(), 2);
    }

    #[test]
    fn surfaces_a_single_syntax_error_on_malformed_input() {
        let (program, errors) = parse("logs | where");
        assert!(program.is_none());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ParseError::Syntax(_)));
    }

    #[test]
    fn surfaces_a_lex_error_before_parsing_begins() {
        let (program, errors) = parse("logs | where a = \"unterminated");
        assert!(program.is_none());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ParseError::Lex(_)));
    }

    #[test]
    fn round_trips_through_display_and_reparses_to_the_same_ast() {
        let (program, errors) = parse("logs | where severity == \"high\" | top 10 by severity desc");
        assert!(errors.is_empty());
        let program = program.unwrap();
        let rendered = program.to_string();
        let (reparsed, errors2) = parse(&rendered);
        assert!(errors2.is_empty());
        assert_eq!(program, reparsed.unwrap());
    }
}
