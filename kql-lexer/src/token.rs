#[cfg(not(feature = "std"))]
use alloc::string::String;
use core::fmt;

use kql_common::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of clause/literal keywords. Contextual operator words
/// (`and`, `or`, `not`, `contains`, `in`, ...) are NOT part of this
/// enumeration -- they tokenize directly as their own [`TokenKind`]
/// variants, per the lexer's contextual-operator-word rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum Keyword {
    Let,
    Where,
    Project,
    Extend,
    Summarize,
    Order,
    By,
    Top,
    Limit,
    Distinct,
    Join,
    Union,
    Inner,
    Left,
    Right,
    Full,
    LeftAnti,
    RightSemi,
    On,
    As,
    Asc,
    Desc,
    True,
    False,
    Null,
    Case,
    When,
    Then,
    Else,
    End,
}

/// All keywords, sorted by their uppercase spelling, for binary-search
/// lookup. Kept in lockstep with [`KEYWORD_STRINGS`].
pub const KEYWORDS: &[Keyword] = &[
    Keyword::As,
    Keyword::Asc,
    Keyword::By,
    Keyword::Case,
    Keyword::Desc,
    Keyword::Distinct,
    Keyword::Else,
    Keyword::End,
    Keyword::Extend,
    Keyword::False,
    Keyword::Full,
    Keyword::Inner,
    Keyword::Join,
    Keyword::Left,
    Keyword::LeftAnti,
    Keyword::Let,
    Keyword::Limit,
    Keyword::Null,
    Keyword::On,
    Keyword::Order,
    Keyword::Project,
    Keyword::Right,
    Keyword::RightSemi,
    Keyword::Summarize,
    Keyword::Then,
    Keyword::Top,
    Keyword::True,
    Keyword::Union,
    Keyword::When,
    Keyword::Where,
];

/// Uppercase spellings, sorted to match [`KEYWORDS`] exactly.
pub const KEYWORD_STRINGS: &[&str] = &[
    "AS",
    "ASC",
    "BY",
    "CASE",
    "DESC",
    "DISTINCT",
    "ELSE",
    "END",
    "EXTEND",
    "FALSE",
    "FULL",
    "INNER",
    "JOIN",
    "LEFT",
    "LEFTANTI",
    "LET",
    "LIMIT",
    "NULL",
    "ON",
    "ORDER",
    "PROJECT",
    "RIGHT",
    "RIGHTSEMI",
    "SUMMARIZE",
    "THEN",
    "TOP",
    "TRUE",
    "UNION",
    "WHEN",
    "WHERE",
];

impl Keyword {
    /// Looks up a keyword by spelling, case-insensitively, via binary
    /// search over the sorted [`KEYWORD_STRINGS`] table.
    pub fn lookup(word: &str) -> Option<Keyword> {
        let upper = word.to_uppercase();
        KEYWORD_STRINGS
            .binary_search(&upper.as_str())
            .ok()
            .map(|i| KEYWORDS[i])
    }

    /// The canonical uppercase spelling of this keyword.
    pub fn as_str(self) -> &'static str {
        KEYWORD_STRINGS[KEYWORDS.binary_search(&self).unwrap()]
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ord for Keyword {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}
impl PartialOrd for Keyword {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The closed enumeration of token kinds produced by the lexer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum TokenKind {
    // Literals
    String(String),
    Number(String),
    DateTime(String),
    Timespan(String),
    Guid(String),
    Boolean(bool),
    Null,

    // Identifiers
    Ident(String),
    QuotedIdent(String),

    // Keyword
    Keyword(Keyword),

    // Punctuation
    Pipe,
    Comma,
    SemiColon,
    Dot,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Assignment (used by `let`/`extend`; not a valid equality operator)
    Assign,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // String operators
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Matches,
    Like,

    // Membership
    In,
    NotIn,
    Between,

    // Logical
    And,
    Or,
    Not,

    // Trivia (produced by the lexer, filtered out by the parser)
    Whitespace,
    Newline,
    Comment(String),

    // Sentinels
    Eof,
    Invalid(char),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::String(s) => write!(f, "'{}'", s),
            TokenKind::Number(s) => write!(f, "{}", s),
            TokenKind::DateTime(s) => write!(f, "{}", s),
            TokenKind::Timespan(s) => write!(f, "{}", s),
            TokenKind::Guid(s) => write!(f, "{}", s),
            TokenKind::Boolean(b) => write!(f, "{}", b),
            TokenKind::Null => f.write_str("null"),
            TokenKind::Ident(s) => write!(f, "{}", s),
            TokenKind::QuotedIdent(s) => write!(f, "`{}`", s),
            TokenKind::Keyword(k) => write!(f, "{}", k),
            TokenKind::Pipe => f.write_str("|"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::SemiColon => f.write_str(";"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::LeftParen => f.write_str("("),
            TokenKind::RightParen => f.write_str(")"),
            TokenKind::LeftBracket => f.write_str("["),
            TokenKind::RightBracket => f.write_str("]"),
            TokenKind::LeftBrace => f.write_str("{"),
            TokenKind::RightBrace => f.write_str("}"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::Assign => f.write_str("="),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::NotEq => f.write_str("!="),
            TokenKind::Lt => f.write_str("<"),
            TokenKind::LtEq => f.write_str("<="),
            TokenKind::Gt => f.write_str(">"),
            TokenKind::GtEq => f.write_str(">="),
            TokenKind::Contains => f.write_str("contains"),
            TokenKind::NotContains => f.write_str("!contains"),
            TokenKind::StartsWith => f.write_str("startswith"),
            TokenKind::EndsWith => f.write_str("endswith"),
            TokenKind::Matches => f.write_str("matches"),
            TokenKind::Like => f.write_str("like"),
            TokenKind::In => f.write_str("in"),
            TokenKind::NotIn => f.write_str("!in"),
            TokenKind::Between => f.write_str("between"),
            TokenKind::And => f.write_str("and"),
            TokenKind::Or => f.write_str("or"),
            TokenKind::Not => f.write_str("not"),
            TokenKind::Whitespace => f.write_str(" "),
            TokenKind::Newline => f.write_str("\n"),
            TokenKind::Comment(s) => write!(f, "//{}", s),
            TokenKind::Eof => f.write_str("<eof>"),
            TokenKind::Invalid(c) => write!(f, "{}", c),
        }
    }
}

/// A single lexed token: its kind, the exact source slice it covers, and
/// its position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    /// The token's kind.
    pub kind: TokenKind,
    /// The exact source text this token covers; `lexeme == source[span]`.
    pub lexeme: String,
    /// Byte-offset span into the source.
    pub span: Span,
    /// 1-based source line the token starts on.
    pub line: u32,
    /// 1-based source column the token starts on.
    pub column: u32,
}

impl Token {
    /// True if this token should be filtered before parsing: whitespace,
    /// comments, and newlines are produced by the lexer but carry no
    /// grammatical meaning.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment(_)
        )
    }

    /// True if this token is a keyword equal to `kw`.
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(&self.kind, TokenKind::Keyword(k) if *k == kw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
