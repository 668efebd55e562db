//! Statement and block parsing.

use ztn_ast::{Block, LetStmt, Node, Stmt};
use ztn_lexer::TokenKind;

use crate::parser::Parser;
use crate::ParseResult;

impl Parser {
    /// Parses `{ stmt* }`. A bad statement is recorded and the cursor skips
    /// to the next `;` or the block's closing `}` so the rest of the block
    /// still gets parsed.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Node<Block>> {
        let start = self.consume(TokenKind::LBrace, "`{`")?.span;
        let mut stmts = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.diags.push(err.into_diagnostic());
                    self.recover_in_block();
                }
            }
        }

        let end = self.consume(TokenKind::RBrace, "`}`")?.span;
        Ok(Node::new(Block { stmts }, start.merge(&end)))
    }

    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        match self.current_token().kind {
            TokenKind::Let => self.parse_let_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(Node::new(Stmt::Block(block), span))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// let_stmt := "let" "mut"? ident (":" type)? "=" expression ";"
    fn parse_let_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.consume(TokenKind::Let, "`let`")?.span;
        let mutable = if self.check(TokenKind::Mut) {
            self.advance();
            true
        } else {
            false
        };
        let name = self.parse_identifier()?;
        let ty = if self.check(TokenKind::Colon) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };
        self.consume(TokenKind::Eq, "`=`")?;
        let init = self.parse_expression()?;
        let end = self.consume(TokenKind::Semicolon, "`;`")?.span;
        Ok(Node::new(
            Stmt::Let(LetStmt {
                name,
                mutable,
                ty,
                init,
            }),
            start.merge(&end),
        ))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.consume(TokenKind::Return, "`return`")?.span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let end = self.consume(TokenKind::Semicolon, "`;`")?.span;
        Ok(Node::new(Stmt::Return(value), start.merge(&end)))
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.consume(TokenKind::If, "`if`")?.span;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;
        let else_block = if self.check(TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        let end = else_block
            .as_ref()
            .map(|b| b.span)
            .unwrap_or(then_block.span);
        Ok(Node::new(
            Stmt::If {
                condition,
                then_block,
                else_block,
            },
            start.merge(&end),
        ))
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.consume(TokenKind::While, "`while`")?.span;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(Node::new(Stmt::While { condition, body }, span))
    }

    fn parse_expr_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let expr = self.parse_expression()?;
        let end = self.consume(TokenKind::Semicolon, "`;`")?.span;
        let span = expr.span.merge(&end);
        Ok(Node::new(Stmt::Expr(expr), span))
    }
}
