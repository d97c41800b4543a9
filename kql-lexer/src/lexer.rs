#[cfg(not(feature = "std"))]
use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use kql_common::Span;

use crate::{
    error::LexError,
    token::{Keyword, Token, TokenKind},
};

/// The greedily-matched timespan unit suffixes, longest first so that
/// `"ms"` is preferred over `"m"` and `"microsecond"` over `"m"`.
const TIMESPAN_SUFFIXES: &[&str] = &["nanosecond", "microsecond", "ms", "d", "h", "m", "s"];

/// Single-pass KQL lexer over a UTF-8 source string. Maintains a byte
/// cursor plus `{line, column}`, mirroring the character-scanner shape
/// the teacher uses but addressed by byte offset rather than a bare
/// `Peekable<Chars>`, since KQL's multi-character lookahead (GUIDs,
/// `datetime(...)`, timespan suffixes, `!contains`/`!in`) needs cheap
/// slicing the teacher's dialects never required.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            errors: Vec::new(),
        }
    }

    /// Tokenizes the whole input, terminating with an `Eof` token. Never
    /// aborts: lexical problems are collected and returned alongside the
    /// token stream.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let start = self.pos;
            let (line, column) = (self.line, self.column);
            match self.next_token() {
                Some(kind) => {
                    let lexeme = self.input[start..self.pos].to_string();
                    tokens.push(Token {
                        kind,
                        lexeme,
                        span: Span::new(start as u32, self.pos as u32),
                        line,
                        column,
                    });
                }
                None => {
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        lexeme: String::new(),
                        span: Span::at(self.pos as u32),
                        line: self.line,
                        column: self.column,
                    });
                    break;
                }
            }
        }
        (tokens, self.errors)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek2(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Case-insensitive check that the remaining input starts with `word`
    /// and that `word` is not itself a prefix of a longer identifier.
    fn rest_is_word_ci(&self, word: &str) -> bool {
        let rest = self.rest();
        let Some(prefix) = rest.get(..word.len()) else {
            return false;
        };
        if !prefix.eq_ignore_ascii_case(word) {
            return false;
        }
        match rest[word.len()..].chars().next() {
            Some(c) => !(c.is_ascii_alphanumeric() || c == '_'),
            None => true,
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(LexError {
            message: message.into(),
            position: self.pos as u32,
            line: self.line,
            column: self.column,
        });
    }

    fn next_token(&mut self) -> Option<TokenKind> {
        let ch = self.peek()?;
        Some(match ch {
            ' ' | '\t' | '\r' => self.tokenize_whitespace(),
            '\n' => {
                self.bump();
                TokenKind::Newline
            }
            '"' | '\'' => self.tokenize_string(ch),
            '`' => self.tokenize_quoted_ident(),
            c if c.is_ascii_digit() => self.tokenize_number(),
            c if c.is_alphabetic() || c == '_' => self.tokenize_word(),
            _ => self.tokenize_symbol(),
        })
    }

    fn tokenize_whitespace(&mut self) -> TokenKind {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }
        TokenKind::Whitespace
    }

    fn tokenize_string(&mut self, quote: char) -> TokenKind {
        self.bump(); // consume open quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error("Unterminated string literal");
                    break;
                }
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    match self.bump() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some('\'') => value.push('\''),
                        Some(other) => value.push(other),
                        None => {
                            self.error("Unterminated string literal");
                            break;
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        TokenKind::String(value)
    }

    fn tokenize_quoted_ident(&mut self) -> TokenKind {
        self.bump(); // consume backtick
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error("Unterminated quoted identifier");
                    break;
                }
                Some('`') => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        TokenKind::QuotedIdent(value)
    }

    fn tokenize_number(&mut self) -> TokenKind {
        let mut s = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
            s.push(c);
            self.bump();
        }
        if self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit()) {
            s.push('.');
            self.bump();
            while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                s.push(c);
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut lookahead = 1;
            if matches!(self.peek2(), Some('+' | '-')) {
                lookahead += 1;
            }
            let digit_after = self.rest().chars().nth(lookahead).is_some_and(|c| c.is_ascii_digit());
            if digit_after {
                s.push(self.bump().unwrap());
                if matches!(self.peek(), Some('+' | '-')) {
                    s.push(self.bump().unwrap());
                }
                while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                    s.push(c);
                    self.bump();
                }
            }
        }

        for suffix in TIMESPAN_SUFFIXES {
            if self.rest_is_word_ci(suffix) {
                let mut lexeme = s;
                lexeme.push_str(suffix);
                for _ in 0..suffix.len() {
                    self.bump();
                }
                return TokenKind::Timespan(lexeme);
            }
        }
        TokenKind::Number(s)
    }

    fn tokenize_word(&mut self) -> TokenKind {
        // `datetime(...)` literal
        if self.rest_is_word_ci("datetime") {
            let mut lookahead = self.clone_cursor();
            for _ in 0..8 {
                lookahead.bump();
            }
            if lookahead.peek() == Some('(') {
                return self.tokenize_datetime_literal();
            }
        }

        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            let _ = c;
            self.bump();
        }
        let word = self.input[start..self.pos].to_string();

        if let Some(guid) = self.try_tokenize_guid(&word) {
            return guid;
        }

        match word.to_ascii_uppercase().as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "CONTAINS" => TokenKind::Contains,
            "STARTSWITH" => TokenKind::StartsWith,
            "ENDSWITH" => TokenKind::EndsWith,
            "MATCHES" => TokenKind::Matches,
            "LIKE" => TokenKind::Like,
            "IN" => TokenKind::In,
            "BETWEEN" => TokenKind::Between,
            "TRUE" => TokenKind::Boolean(true),
            "FALSE" => TokenKind::Boolean(false),
            "NULL" => TokenKind::Null,
            _ => match Keyword::lookup(&word) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Ident(word),
            },
        }
    }

    /// Checks whether `base` (already consumed, expected to be 8 hex
    /// digits) is followed by `-xxxx-xxxx-xxxx-xxxxxxxxxxxx` forming a
    /// canonical GUID; if so, consumes the remainder and returns the
    /// combined GUID token.
    fn try_tokenize_guid(&mut self, base: &str) -> Option<TokenKind> {
        if base.len() != 8 || !base.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let groups = [4usize, 4, 4, 12];
        let rest = self.rest();
        let mut offset = 0;
        for &len in &groups {
            let chunk = rest.get(offset..)?;
            if !chunk.starts_with('-') {
                return None;
            }
            let hex = chunk.get(1..1 + len)?;
            if hex.len() != len || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            offset += 1 + len;
        }
        let mut lexeme = base.to_string();
        lexeme.push_str(&rest[..offset]);
        for _ in 0..offset {
            self.bump();
        }
        Some(TokenKind::Guid(lexeme))
    }

    fn tokenize_datetime_literal(&mut self) -> TokenKind {
        let start = self.pos;
        for _ in 0..8 {
            self.bump(); // consume "datetime"
        }
        self.bump(); // consume '('
        let mut depth = 1;
        loop {
            match self.bump() {
                Some('(') => depth += 1,
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(_) => {}
                None => {
                    self.error("Unterminated datetime literal");
                    break;
                }
            }
        }
        TokenKind::DateTime(self.input[start..self.pos].to_string())
    }

    fn tokenize_symbol(&mut self) -> TokenKind {
        let ch = self.bump().unwrap();
        match ch {
            '|' => TokenKind::Pipe,
            ',' => TokenKind::Comma,
            ';' => TokenKind::SemiColon,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '%' => TokenKind::Percent,
            '=' => {
                if self.bump_if('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '<' => {
                if self.bump_if('=') {
                    TokenKind::LtEq
                } else if self.bump_if('>') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.bump_if('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '!' => {
                if self.bump_if('=') {
                    TokenKind::NotEq
                } else if self.rest_is_word_ci("contains") {
                    for _ in 0.."contains".len() {
                        self.bump();
                    }
                    TokenKind::NotContains
                } else if self.rest_is_word_ci("in") {
                    for _ in 0.."in".len() {
                        self.bump();
                    }
                    TokenKind::NotIn
                } else {
                    self.error("Expected '=', 'contains' or 'in' after '!'");
                    TokenKind::Invalid('!')
                }
            }
            '/' => {
                if self.bump_if('/') {
                    self.tokenize_line_comment()
                } else if self.bump_if('*') {
                    self.tokenize_block_comment()
                } else {
                    TokenKind::Slash
                }
            }
            other => {
                self.error(format!("Unrecognized character '{}'", other));
                TokenKind::Invalid(other)
            }
        }
    }

    fn tokenize_line_comment(&mut self) -> TokenKind {
        let start = self.pos;
        while !matches!(self.peek(), None | Some('\n')) {
            self.bump();
        }
        TokenKind::Comment(self.input[start..self.pos].to_string())
    }

    fn tokenize_block_comment(&mut self) -> TokenKind {
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    self.error("Unterminated block comment");
                    break;
                }
                Some('*') if self.peek2() == Some('/') => {
                    let end = self.pos;
                    self.bump();
                    self.bump();
                    return TokenKind::Comment(self.input[start..end].to_string());
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        TokenKind::Comment(self.input[start..self.pos].to_string())
    }

    /// A read-only snapshot used for small fixed-length lookahead that
    /// doesn't fit the single/double-peek helpers above.
    fn clone_cursor(&self) -> Lexer<'a> {
        Lexer {
            input: self.input,
            pos: self.pos,
            line: self.line,
            column: self.column,
            errors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, errors) = Lexer::new(src).tokenize();
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenize_simple_pipeline() {
        let got = kinds("logs | where severity == \"high\"");
        assert_eq!(
            got,
            vec![
                TokenKind::Ident("logs".into()),
                TokenKind::Whitespace,
                TokenKind::Pipe,
                TokenKind::Whitespace,
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Whitespace,
                TokenKind::Ident("severity".into()),
                TokenKind::Whitespace,
                TokenKind::EqEq,
                TokenKind::Whitespace,
                TokenKind::String("high".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_let_uses_assign() {
        let got = kinds("let x = 5");
        assert_eq!(
            got,
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Whitespace,
                TokenKind::Ident("x".into()),
                TokenKind::Whitespace,
                TokenKind::Assign,
                TokenKind::Whitespace,
                TokenKind::Number("5".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_bang_forms() {
        assert_eq!(
            kinds("a !contains b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Whitespace,
                TokenKind::NotContains,
                TokenKind::Whitespace,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a !in b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Whitespace,
                TokenKind::NotIn,
                TokenKind::Whitespace,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a != b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Whitespace,
                TokenKind::NotEq,
                TokenKind::Whitespace,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_timespan_suffix() {
        assert_eq!(
            kinds("ago(1h)"),
            vec![
                TokenKind::Ident("ago".into()),
                TokenKind::LeftParen,
                TokenKind::Timespan("1h".into()),
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("30ms"), vec![TokenKind::Timespan("30ms".into()), TokenKind::Eof]);
    }

    #[test]
    fn tokenize_datetime_literal() {
        assert_eq!(
            kinds("datetime(2024-01-01)"),
            vec![
                TokenKind::DateTime("datetime(2024-01-01)".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_guid_literal() {
        let src = "550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(
            kinds(src),
            vec![TokenKind::Guid(src.into()), TokenKind::Eof]
        );
        // not a guid: wrong group length falls back to identifier + symbols
        let (tokens, _errors) = Lexer::new("550e8400-xyz").tokenize();
        assert!(matches!(tokens[0].kind, TokenKind::Ident(_)));
    }

    #[test]
    fn tokenize_number_forms() {
        assert_eq!(kinds("123"), vec![TokenKind::Number("123".into()), TokenKind::Eof]);
        assert_eq!(kinds("1.5"), vec![TokenKind::Number("1.5".into()), TokenKind::Eof]);
        assert_eq!(
            kinds("1.5e10"),
            vec![TokenKind::Number("1.5e10".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds("table.column"),
            vec![
                TokenKind::Ident("table".into()),
                TokenKind::Dot,
                TokenKind::Ident("column".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_comments() {
        assert_eq!(
            kinds("1 // trailing\n2"),
            vec![
                TokenKind::Number("1".into()),
                TokenKind::Whitespace,
                TokenKind::Comment(" trailing".into()),
                TokenKind::Newline,
                TokenKind::Number("2".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("/* block */1"),
            vec![
                TokenKind::Comment(" block ".into()),
                TokenKind::Number("1".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_error_and_continues() {
        let (tokens, errors) = Lexer::new("where x == \"open").tokenize();
        assert!(!errors.is_empty());
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::Eof)));
    }

    #[test]
    fn unexpected_bang_is_invalid_but_continues() {
        let (tokens, errors) = Lexer::new("a ! b").tokenize();
        assert!(!errors.is_empty());
        assert!(tokens
            .iter()
            .any(|t| matches!(t.kind, TokenKind::Invalid('!'))));
        // lexing continues past the bad character
        assert!(tokens
            .iter()
            .any(|t| matches!(&t.kind, TokenKind::Ident(s) if s == "b")));
    }

    #[test]
    fn span_round_trip_integrity() {
        let src = "logs | where a == 1";
        let (tokens, _) = Lexer::new(src).tokenize();
        for tok in &tokens {
            if tok.kind == TokenKind::Eof {
                continue;
            }
            let slice = &src[tok.span.start as usize..tok.span.end as usize];
            assert_eq!(slice, tok.lexeme);
            assert!(tok.span.end >= tok.span.start);
        }
    }

    #[test]
    fn span_offsets_monotonic() {
        let src = "logs | where severity == \"high\" and count > 10";
        let (tokens, _) = Lexer::new(src).tokenize();
        let mut last = 0u32;
        for tok in &tokens {
            assert!(tok.span.start >= last);
            last = tok.span.start;
        }
    }
}
