#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec, vec::Vec};

use kql_ast::*;
use kql_common::Span;
use kql_lexer::{Keyword, TokenKind};

use crate::{error::ParseError, parser::Parser};

// Precedence levels, low to high, matching the nine-level table:
// or / and / equality / comparison / string-op / additive / multiplicative
// / unary / postfix / primary. Unary and postfix are not part of the
// binary climbing table below -- they are handled directly in
// `parse_prefix` and the postfix loop in `parse_primary`.
const PREC_OR: u8 = 10;
const PREC_AND: u8 = 20;
const PREC_EQUALITY: u8 = 30;
const PREC_COMPARISON: u8 = 40;
const PREC_STRING_OP: u8 = 50;
const PREC_ADDITIVE: u8 = 60;
const PREC_MULTIPLICATIVE: u8 = 70;
const PREC_UNARY: u8 = 80;

impl Parser {
    /// Parses a full expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_subexpr(0)
    }

    /// Precedence-climbing expression parser: parses a prefix, then
    /// consumes infix operators whose precedence is strictly greater
    /// than `min_precedence`.
    pub fn parse_subexpr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut expr = self.parse_prefix()?;
        loop {
            if self.peek_token().map(|t| &t.kind) == Some(&TokenKind::Assign) {
                // `=` is reserved for `let`/`extend` assignment and is
                // consumed directly by those productions before `parse_expr`
                // is ever called; seeing it here means the grammar wanted
                // `==` for equality.
                let found = self.peek_token().cloned();
                return self.expected("'==' (bare '=' is not a valid expression operator)", found);
            }
            let next_precedence = self.next_precedence();
            if min_precedence >= next_precedence {
                break;
            }
            expr = self.parse_infix(expr, next_precedence)?;
        }
        Ok(expr)
    }

    fn next_precedence(&mut self) -> u8 {
        let precedence = match self.peek_token().map(|t| &t.kind) {
            Some(TokenKind::Or) => PREC_OR,
            Some(TokenKind::And) => PREC_AND,
            Some(TokenKind::EqEq | TokenKind::NotEq) => PREC_EQUALITY,
            Some(
                TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::Gt
                | TokenKind::GtEq
                | TokenKind::In
                | TokenKind::NotIn
                | TokenKind::Between,
            ) => PREC_COMPARISON,
            Some(
                TokenKind::Contains
                | TokenKind::NotContains
                | TokenKind::StartsWith
                | TokenKind::EndsWith
                | TokenKind::Matches
                | TokenKind::Like,
            ) => PREC_STRING_OP,
            Some(TokenKind::Plus | TokenKind::Minus) => PREC_ADDITIVE,
            Some(TokenKind::Star | TokenKind::Slash | TokenKind::Percent) => PREC_MULTIPLICATIVE,
            _ => 0,
        };
        self.reset_peek_cursor();
        precedence
    }

    fn parse_infix(&mut self, left: Expr, precedence: u8) -> Result<Expr, ParseError> {
        let token = self.next_token().expect("next_precedence confirmed a token");
        let left_span = left.span();
        let op = match token.kind {
            TokenKind::Or => BinaryOperator::Or,
            TokenKind::And => BinaryOperator::And,
            TokenKind::EqEq => BinaryOperator::Eq,
            TokenKind::NotEq => BinaryOperator::NotEq,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::LtEq => BinaryOperator::LtEq,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::GtEq => BinaryOperator::GtEq,
            TokenKind::Contains => BinaryOperator::Contains,
            TokenKind::NotContains => BinaryOperator::NotContains,
            TokenKind::StartsWith => BinaryOperator::StartsWith,
            TokenKind::EndsWith => BinaryOperator::EndsWith,
            TokenKind::Matches => BinaryOperator::Matches,
            TokenKind::Like => BinaryOperator::Like,
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Percent => BinaryOperator::Mod,
            TokenKind::In => {
                let right = self.parse_paren_list()?;
                let right_span = right.span;
                return Ok(Expr::Binary(BinaryExpr {
                    op: BinaryOperator::In,
                    left: Box::new(left),
                    right: Box::new(Expr::Array(right)),
                    span: left_span.cover(right_span),
                }));
            }
            TokenKind::NotIn => {
                let right = self.parse_paren_list()?;
                let right_span = right.span;
                return Ok(Expr::Binary(BinaryExpr {
                    op: BinaryOperator::NotIn,
                    left: Box::new(left),
                    right: Box::new(Expr::Array(right)),
                    span: left_span.cover(right_span),
                }));
            }
            TokenKind::Between => {
                // The grammar leaves `between`'s inner syntax unspecified;
                // modeled on `in`'s parenthesized list as `between (low, high)`
                // rather than inventing a `..` range token the lexer
                // contract doesn't define.
                let right = self.parse_paren_list()?;
                let right_span = right.span;
                return Ok(Expr::Binary(BinaryExpr {
                    op: BinaryOperator::Between,
                    left: Box::new(left),
                    right: Box::new(Expr::Array(right)),
                    span: left_span.cover(right_span),
                }));
            }
            other => {
                return self.expected("an infix operator", Some(other));
            }
        };
        let right = self.parse_subexpr(precedence)?;
        let span = left_span.cover(right.span());
        Ok(Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        }))
    }

    /// Parses `'(' expr (',' expr)* ')'`, used by `in`/`!in`/`between`.
    fn parse_paren_list(&mut self) -> Result<ArrayExpr, ParseError> {
        let start = self.current_offset();
        self.expect_token(&TokenKind::LeftParen)?;
        let elements = self.parse_comma_separated(Parser::parse_expr)?;
        let end = self.current_offset();
        self.expect_token(&TokenKind::RightParen)?;
        Ok(ArrayExpr {
            elements,
            span: Span::new(start, end),
        })
    }

    /// Parses a prefix: unary operators, or a primary expression with its
    /// postfix chain.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_offset();
        match self.peek_token().map(|t| &t.kind) {
            Some(TokenKind::Not) => {
                self.next_token();
                let expr = self.parse_subexpr(PREC_UNARY)?;
                let span = Span::new(start, expr.span().end);
                Ok(Expr::Unary(UnaryExpr {
                    op: UnaryOperator::Not,
                    expr: Box::new(expr),
                    span,
                }))
            }
            Some(TokenKind::Minus) => {
                self.next_token();
                let expr = self.parse_subexpr(PREC_UNARY)?;
                let span = Span::new(start, expr.span().end);
                Ok(Expr::Unary(UnaryExpr {
                    op: UnaryOperator::Neg,
                    expr: Box::new(expr),
                    span,
                }))
            }
            Some(TokenKind::Plus) => {
                self.next_token();
                let expr = self.parse_subexpr(PREC_UNARY)?;
                let span = Span::new(start, expr.span().end);
                Ok(Expr::Unary(UnaryExpr {
                    op: UnaryOperator::Plus,
                    expr: Box::new(expr),
                    span,
                }))
            }
            _ => self.parse_primary(),
        }
    }

    /// Parses a primary expression, then its postfix `.member` / `[index]`
    /// chain.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_atom()?;
        loop {
            match self.peek_token().map(|t| &t.kind) {
                Some(TokenKind::Dot) => {
                    self.next_token();
                    let property = self.expect_ident()?;
                    let span = Span::new(expr.span().start, self.current_offset());
                    expr = Expr::Member(MemberExpr::Dot {
                        object: Box::new(expr),
                        property,
                        span,
                    });
                }
                Some(TokenKind::LeftBracket) => {
                    self.next_token();
                    let index = self.parse_expr()?;
                    self.expect_token(&TokenKind::RightBracket)?;
                    let span = Span::new(expr.span().start, self.current_offset());
                    expr = Expr::Member(MemberExpr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        span,
                    });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary_atom(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_offset();
        let token = match self.next_token() {
            Some(t) => t,
            None => return self.expected("an expression", Option::<&str>::None),
        };
        let span_of = |end: u32| Span::new(start, end);
        match token.kind {
            TokenKind::String(s) => Ok(Expr::Literal(Literal {
                value: LiteralValue::String(s),
                span: span_of(token.span.end),
            })),
            TokenKind::Number(s) => Ok(Expr::Literal(Literal {
                value: LiteralValue::Number(s),
                span: span_of(token.span.end),
            })),
            TokenKind::DateTime(s) => Ok(Expr::Literal(Literal {
                value: LiteralValue::DateTime(s),
                span: span_of(token.span.end),
            })),
            TokenKind::Timespan(s) => Ok(Expr::Literal(Literal {
                value: LiteralValue::Timespan(s),
                span: span_of(token.span.end),
            })),
            TokenKind::Guid(s) => Ok(Expr::Literal(Literal {
                value: LiteralValue::Guid(s),
                span: span_of(token.span.end),
            })),
            TokenKind::Boolean(b) => Ok(Expr::Literal(Literal {
                value: LiteralValue::Boolean(b),
                span: span_of(token.span.end),
            })),
            TokenKind::Null => Ok(Expr::Literal(Literal {
                value: LiteralValue::Null,
                span: span_of(token.span.end),
            })),
            TokenKind::Keyword(Keyword::True) => Ok(Expr::Literal(Literal {
                value: LiteralValue::Boolean(true),
                span: span_of(token.span.end),
            })),
            TokenKind::Keyword(Keyword::False) => Ok(Expr::Literal(Literal {
                value: LiteralValue::Boolean(false),
                span: span_of(token.span.end),
            })),
            TokenKind::Keyword(Keyword::Case) => self.parse_case(start),
            TokenKind::Ident(name) | TokenKind::QuotedIdent(name) => {
                if self.next_token_if_is(&TokenKind::LeftParen) {
                    self.parse_call(name, start)
                } else {
                    Ok(Expr::Identifier(IdentifierExpr {
                        name,
                        span: span_of(token.span.end),
                    }))
                }
            }
            TokenKind::LeftParen => {
                let inner = self.parse_expr()?;
                self.expect_token(&TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::LeftBracket => self.parse_array(start),
            other => self.expected("an expression", Some(other)),
        }
    }

    fn parse_call(&mut self, callee: String, start: u32) -> Result<Expr, ParseError> {
        let args = if self.peek_token().map(|t| &t.kind) == Some(&TokenKind::RightParen) {
            Vec::new()
        } else {
            self.parse_comma_separated(Parser::parse_expr)?
        };
        let end = self.current_offset();
        self.expect_token(&TokenKind::RightParen)?;
        let span = Span::new(start, end.max(start));
        // `iif`/`iff` is KQL's ternary builtin; lower it to `Conditional`
        // instead of a generic call so later passes can match it directly.
        if args.len() == 3 && (callee.eq_ignore_ascii_case("iif") || callee.eq_ignore_ascii_case("iff")) {
            let mut iter = args.into_iter();
            let condition = iter.next().unwrap();
            let then_branch = iter.next().unwrap();
            let else_branch = iter.next().unwrap();
            return Ok(Expr::Conditional(ConditionalExpr {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            }));
        }
        Ok(Expr::Call(CallExpr { callee, args, span }))
    }

    fn parse_array(&mut self, start: u32) -> Result<Expr, ParseError> {
        let elements = if self.peek_token().map(|t| &t.kind) == Some(&TokenKind::RightBracket) {
            Vec::new()
        } else {
            self.parse_comma_separated(Parser::parse_expr)?
        };
        let end = self.current_offset();
        self.expect_token(&TokenKind::RightBracket)?;
        Ok(Expr::Array(ArrayExpr {
            elements,
            span: Span::new(start, end.max(start)),
        }))
    }

    fn parse_case(&mut self, start: u32) -> Result<Expr, ParseError> {
        let mut arms = vec![self.parse_case_arm()?];
        while self.parse_keyword(Keyword::When) {
            arms.push(self.parse_when_then()?);
        }
        let else_branch = if self.parse_keyword(Keyword::Else) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword(Keyword::End)?;
        let end = self.current_offset();
        Ok(Expr::Case(CaseExpr {
            arms,
            else_branch,
            span: Span::new(start, end.max(start)),
        }))
    }

    fn parse_case_arm(&mut self) -> Result<CaseArm, ParseError> {
        self.expect_keyword(Keyword::When)?;
        self.parse_when_then()
    }

    fn parse_when_then(&mut self) -> Result<CaseArm, ParseError> {
        let condition = self.parse_expr()?;
        self.expect_keyword(Keyword::Then)?;
        let result = self.parse_expr()?;
        Ok(CaseArm { condition, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kql_lexer::Lexer;

    fn parse_expr_str(src: &str) -> Expr {
        let (tokens, errors) = Lexer::new(src).tokenize();
        assert!(errors.is_empty(), "{:?}", errors);
        let filtered = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
        let mut parser = Parser::new_with_tokens(filtered);
        parser.parse_expr().unwrap()
    }

    #[test]
    fn precedence_and_binds_tighter_than_or() {
        let expr = parse_expr_str("a or b and c");
        match expr {
            Expr::Binary(BinaryExpr { op: BinaryOperator::Or, right, .. }) => {
                assert!(matches!(*right, Expr::Binary(BinaryExpr { op: BinaryOperator::And, .. })));
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn left_associative_additive_chain() {
        let expr = parse_expr_str("1 - 2 - 3");
        // (1 - 2) - 3
        match expr {
            Expr::Binary(BinaryExpr { op: BinaryOperator::Sub, left, .. }) => {
                assert!(matches!(*left, Expr::Binary(BinaryExpr { op: BinaryOperator::Sub, .. })));
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn call_only_forms_on_bare_identifier() {
        let expr = parse_expr_str("count()");
        assert!(matches!(expr, Expr::Call(CallExpr { ref callee, .. }) if callee == "count"));
    }

    #[test]
    fn iif_lowers_to_conditional() {
        let expr = parse_expr_str("iif(a == 1, \"yes\", \"no\")");
        assert!(matches!(expr, Expr::Conditional(_)));
    }

    #[test]
    fn member_and_index_chain() {
        let expr = parse_expr_str("a.b[0]");
        assert!(matches!(expr, Expr::Member(MemberExpr::Index { .. })));
    }

    #[test]
    fn in_operator_parses_parenthesized_list() {
        let expr = parse_expr_str("severity in (\"high\", \"critical\")");
        match expr {
            Expr::Binary(BinaryExpr { op: BinaryOperator::In, right, .. }) => {
                assert!(matches!(*right, Expr::Array(ArrayExpr { ref elements, .. }) if elements.len() == 2));
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn case_when_then_else_end() {
        let expr = parse_expr_str("case when a == 1 then \"one\" else \"other\" end");
        match expr {
            Expr::Case(CaseExpr { arms, else_branch, .. }) => {
                assert_eq!(arms.len(), 1);
                assert!(else_branch.is_some());
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn bare_assign_is_rejected_as_an_expression_operator() {
        let (tokens, errors) = Lexer::new("a = 1").tokenize();
        assert!(errors.is_empty());
        let filtered = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
        let mut parser = Parser::new_with_tokens(filtered);
        assert!(parser.parse_expr().is_err());
    }
}
