//! # kql-lexer
//!
//! Turns KQL source text into a flat token stream. The lexer never
//! aborts: unrecognized input produces an [`TokenKind::Invalid`] token
//! plus a recorded [`LexError`], and scanning continues from the next
//! character. Whitespace, newlines and comments are emitted as trivia
//! tokens for the parser to filter.

#![deny(missing_docs)]
#![deny(unused_imports)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

mod error;
mod lexer;
mod token;

pub use self::{
    error::LexError,
    lexer::Lexer,
    token::{Keyword, Token, TokenKind, KEYWORDS, KEYWORD_STRINGS},
};

/// Tokenizes `input`, returning every token including trivia and `Eof`,
/// plus any lexical errors encountered.
pub fn tokenize(input: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(input).tokenize()
}
