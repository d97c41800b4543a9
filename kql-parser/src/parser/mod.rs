mod expr;
mod operation;
mod query;

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};
use core::fmt::Display;

use kql_lexer::{Keyword, Lexer, Token, TokenKind};

use crate::{
    error::{syntax_error, ParseError},
    peek::{MultiPeek, PeekIteratorExt},
};

/// Recursive-descent KQL parser over a filtered token stream.
pub struct Parser {
    iter: MultiPeek<vec::IntoIter<Token>>,
}

impl Parser {
    /// Creates a parser from an already-lexed, already-filtered token
    /// stream (no trivia, terminated by `Eof`).
    pub fn new_with_tokens(tokens: Vec<Token>) -> Self {
        Self {
            iter: tokens.into_iter().multipeek(),
        }
    }

    /// Lexes `source` and creates a parser over its significant tokens.
    /// Lexical errors are surfaced as a single [`ParseError::Lex`] built
    /// from the first one encountered; the caller typically checks
    /// [`kql_lexer::tokenize`] output directly when it needs every lex
    /// error rather than just the first.
    pub fn new_with_source(source: &str) -> Result<Self, ParseError> {
        let (tokens, errors) = Lexer::new(source).tokenize();
        if let Some(first) = errors.into_iter().next() {
            return Err(first.into());
        }
        let filtered = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
        Ok(Self::new_with_tokens(filtered))
    }

    /// Parses a comma-separated list of one or more items accepted by `f`.
    pub fn parse_comma_separated<T, F>(&mut self, mut f: F) -> Result<Vec<T>, ParseError>
    where
        F: FnMut(&mut Parser) -> Result<T, ParseError>,
    {
        let mut values = vec![f(self)?];
        while self.next_token_if_is(&TokenKind::Comma) {
            values.push(f(self)?);
        }
        Ok(values)
    }

    /// Reports an unexpected-token syntax error.
    pub fn expected<R>(
        &self,
        expected: impl Display,
        found: Option<impl Display>,
    ) -> Result<R, ParseError> {
        if let Some(found) = found {
            syntax_error(format!("expected {}, found {}", expected, found))
        } else {
            syntax_error(format!("expected {}, but input ended", expected))
        }
    }

    /// Consumes the next token and returns `Ok` if it is the given
    /// keyword, `Err` otherwise.
    pub fn expect_keyword(&mut self, expected: Keyword) -> Result<(), ParseError> {
        if self.parse_keyword(expected) {
            Ok(())
        } else {
            let found = self.peek_token().cloned();
            self.expected(expected, found)
        }
    }

    /// Consumes the next token if it is the given keyword.
    pub fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        self.next_token_if(|token| token.is_keyword(keyword)).is_some()
    }

    /// Consumes the next token if it is one of the given keywords,
    /// returning the matched keyword.
    pub fn parse_one_of_keywords(&mut self, keywords: &[Keyword]) -> Option<Keyword> {
        let matched = match self.peek_token() {
            Some(token) => keywords.iter().copied().find(|kw| token.is_keyword(*kw)),
            None => None,
        };
        if matched.is_some() {
            self.next_token();
        }
        matched
    }

    /// Consumes the next token and returns `Ok` if it matches `expected`,
    /// `Err` otherwise.
    pub fn expect_token(&mut self, expected: &TokenKind) -> Result<(), ParseError> {
        if self.next_token_if_is(expected) {
            Ok(())
        } else {
            let found = self.peek_token().cloned();
            self.expected(expected, found)
        }
    }

    /// Consumes the next token if it holds a bare or quoted identifier,
    /// returning its name.
    pub fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Ident(name) | TokenKind::QuotedIdent(name),
                ..
            }) => Ok(name),
            other => self.expected("an identifier", other),
        }
    }

    /// The byte offset the next unconsumed token starts at; `Eof`'s span
    /// start if the stream is exhausted, used to close off trailing
    /// spans.
    pub fn current_offset(&mut self) -> u32 {
        self.peek_token().map(|t| t.span.start).unwrap_or(0)
    }

    /// Returns a reference to the next token without advancing.
    pub fn peek_token(&mut self) -> Option<&Token> {
        self.iter.peek()
    }

    /// Peeks further ahead without resetting the cursor until the next
    /// real `next_token()` call.
    pub fn peek_next_token(&mut self) -> Option<&Token> {
        self.iter.peek_next()
    }

    /// Resets the peek cursor established by [`peek_next_token`].
    pub fn reset_peek_cursor(&mut self) {
        self.iter.reset_cursor();
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Option<Token> {
        self.iter.next()
    }

    /// Consumes and returns the next token if `func` accepts it.
    pub fn next_token_if(&mut self, func: impl FnOnce(&Token) -> bool) -> Option<Token> {
        self.iter.next_if(func)
    }

    /// Consumes the next token and returns `true` if its kind equals
    /// `expected`.
    pub fn next_token_if_is(&mut self, expected: &TokenKind) -> bool {
        self.next_token_if(|t| &t.kind == expected).is_some()
    }
}
