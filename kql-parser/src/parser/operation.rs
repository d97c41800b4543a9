#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use kql_ast::*;
use kql_common::Span;
use kql_lexer::{Keyword, TokenKind};

use crate::{error::ParseError, parser::Parser};

impl Parser {
    /// Parses one post-pipe operation, dispatching on the leading keyword.
    pub fn parse_operation(&mut self) -> Result<Operation, ParseError> {
        let start = self.current_offset();
        let found = self.peek_token().cloned();
        if self.parse_keyword(Keyword::Where) {
            let predicate = self.parse_expr()?;
            let span = Span::new(start, self.current_offset().max(predicate.span().end));
            return Ok(Operation::Where(WhereOp { predicate, span }));
        }
        if self.parse_keyword(Keyword::Project) {
            return self.parse_project(start);
        }
        if self.parse_keyword(Keyword::Extend) {
            return self.parse_extend(start);
        }
        if self.parse_keyword(Keyword::Summarize) {
            return self.parse_summarize(start);
        }
        if self.parse_keyword(Keyword::Order) {
            return self.parse_order(start);
        }
        if self.parse_keyword(Keyword::Top) {
            return self.parse_top(start);
        }
        if self.parse_keyword(Keyword::Limit) {
            let count = self.parse_expr()?;
            let span = Span::new(start, count.span().end);
            return Ok(Operation::Limit(LimitOp { count, span }));
        }
        if self.parse_keyword(Keyword::Distinct) {
            return self.parse_distinct(start);
        }
        if self.parse_keyword(Keyword::Join) {
            return self.parse_join(start);
        }
        if self.parse_keyword(Keyword::Union) {
            return self.parse_union(start);
        }
        self.expected("an operation keyword", found)
    }

    fn parse_project(&mut self, start: u32) -> Result<Operation, ParseError> {
        let columns = self.parse_comma_separated(Parser::parse_project_column)?;
        let span = Span::new(start, self.current_offset().max(start));
        Ok(Operation::Project(ProjectOp { columns, span }))
    }

    fn parse_project_column(&mut self) -> Result<ProjectColumn, ParseError> {
        let expr = self.parse_expr()?;
        let alias = if self.parse_keyword(Keyword::As) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        Ok(ProjectColumn { expr, alias })
    }

    fn parse_extend(&mut self, start: u32) -> Result<Operation, ParseError> {
        let assignments = self.parse_comma_separated(Parser::parse_extend_assignment)?;
        let span = Span::new(start, self.current_offset().max(start));
        Ok(Operation::Extend(ExtendOp { assignments, span }))
    }

    fn parse_extend_assignment(&mut self) -> Result<ExtendAssignment, ParseError> {
        let name = self.expect_ident()?;
        self.expect_token(&TokenKind::Assign)?;
        let expr = self.parse_expr()?;
        Ok(ExtendAssignment { name, expr })
    }

    fn parse_summarize(&mut self, start: u32) -> Result<Operation, ParseError> {
        let aggregations = self.parse_comma_separated(Parser::parse_aggregation)?;
        let by = if self.parse_keyword(Keyword::By) {
            Some(self.parse_comma_separated(Parser::parse_expr)?)
        } else {
            None
        };
        let span = Span::new(start, self.current_offset().max(start));
        Ok(Operation::Summarize(SummarizeOp {
            aggregations,
            by,
            span,
        }))
    }

    fn parse_aggregation(&mut self) -> Result<Aggregation, ParseError> {
        let func = self.expect_ident()?;
        let expr = if self.next_token_if_is(&TokenKind::LeftParen) {
            let expr = if self.peek_token().map(|t| &t.kind) == Some(&TokenKind::RightParen) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect_token(&TokenKind::RightParen)?;
            expr
        } else {
            None
        };
        let alias = if self.parse_keyword(Keyword::As) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        Ok(Aggregation { func, expr, alias })
    }

    fn parse_order(&mut self, start: u32) -> Result<Operation, ParseError> {
        self.expect_keyword(Keyword::By)?;
        let order_by = self.parse_comma_separated(Parser::parse_sort_expr)?;
        let span = Span::new(start, self.current_offset().max(start));
        Ok(Operation::Order(OrderOp { order_by, span }))
    }

    fn parse_sort_expr(&mut self) -> Result<SortExpr, ParseError> {
        let expr = self.parse_expr()?;
        let direction = match self.parse_one_of_keywords(&[Keyword::Asc, Keyword::Desc]) {
            Some(Keyword::Asc) => Some(SortDirection::Ascending),
            Some(Keyword::Desc) => Some(SortDirection::Descending),
            _ => None,
        };
        Ok(SortExpr { expr, direction })
    }

    fn parse_top(&mut self, start: u32) -> Result<Operation, ParseError> {
        let count = self.parse_expr()?;
        let by = if self.parse_keyword(Keyword::By) {
            Some(self.parse_comma_separated(Parser::parse_sort_expr)?)
        } else {
            None
        };
        let span = Span::new(start, self.current_offset().max(start));
        Ok(Operation::Top(TopOp { count, by, span }))
    }

    fn parse_distinct(&mut self, start: u32) -> Result<Operation, ParseError> {
        let at_pipeline_end = matches!(
            self.peek_token().map(|t| &t.kind),
            None | Some(TokenKind::Pipe | TokenKind::SemiColon | TokenKind::Eof)
        );
        let columns = if at_pipeline_end {
            None
        } else {
            Some(self.parse_comma_separated(Parser::parse_expr)?)
        };
        let span = Span::new(start, self.current_offset().max(start));
        Ok(Operation::Distinct(DistinctOp { columns, span }))
    }

    fn parse_join(&mut self, start: u32) -> Result<Operation, ParseError> {
        let kind = match self.parse_one_of_keywords(&[
            Keyword::Inner,
            Keyword::Left,
            Keyword::Right,
            Keyword::Full,
            Keyword::LeftAnti,
            Keyword::RightSemi,
        ]) {
            Some(Keyword::Inner) => JoinKind::Inner,
            Some(Keyword::Left) => JoinKind::Left,
            Some(Keyword::Right) => JoinKind::Right,
            Some(Keyword::Full) => JoinKind::Full,
            Some(Keyword::LeftAnti) => JoinKind::LeftAnti,
            Some(Keyword::RightSemi) => JoinKind::RightSemi,
            _ => JoinKind::Inner,
        };
        let table = self.parse_table_expr()?;
        self.expect_keyword(Keyword::On)?;
        let on = self.parse_expr()?;
        let span = Span::new(start, self.current_offset().max(on.span().end));
        Ok(Operation::Join(Box::new(JoinOp {
            kind,
            table,
            on,
            span,
        })))
    }

    fn parse_union(&mut self, start: u32) -> Result<Operation, ParseError> {
        let tables = self.parse_comma_separated(Parser::parse_table_expr)?;
        let span = Span::new(start, self.current_offset().max(start));
        Ok(Operation::Union(UnionOp { tables, span }))
    }

    /// Parses `IDENT IDENT?`; the second identifier is an alias unless it
    /// would instead be consumed as the start of the next clause (`on` for
    /// joins, or the pipeline's next `|`).
    pub fn parse_table_expr(&mut self) -> Result<TableExpression, ParseError> {
        let start = self.current_offset();
        let name = self.expect_ident()?;
        let alias = match self.peek_token().map(|t| &t.kind) {
            Some(TokenKind::Ident(_) | TokenKind::QuotedIdent(_)) => Some(self.expect_ident()?),
            _ => None,
        };
        let span = Span::new(start, self.current_offset().max(start));
        Ok(TableExpression { name, alias, span })
    }
}
