//! Expression parsing.
//!
//! Precedence climbing over a numeric binding-power table; assignment sits
//! below all binary operators and associates to the right.

use ztn_ast::{Expr, Literal, Node, UnaryOp};
use ztn_lexer::TokenKind;

use crate::parser::Parser;
use crate::ParseResult;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_assignment()
    }

    /// Parses a condition expression for `if`/`while`. Struct literals are
    /// suppressed so the following `{` always opens the body.
    pub(crate) fn parse_condition(&mut self) -> ParseResult<Node<Expr>> {
        let saved = self.allow_struct_literal;
        self.allow_struct_literal = false;
        let result = self.parse_expression();
        self.allow_struct_literal = saved;
        result
    }

    fn parse_assignment(&mut self) -> ParseResult<Node<Expr>> {
        let target = self.parse_binary(1)?;

        if self.check(TokenKind::Eq) {
            let eq_span = self.current_token().span;
            if !is_assign_target(&target.value) {
                return Err(crate::error::ParseError::new(
                    "an assignable place (a variable or field) before `=`",
                    "`=`".to_string(),
                    eq_span,
                ));
            }
            self.advance();
            let value = self.parse_assignment()?;
            let span = target.span.merge(&value.span);
            return Ok(Node::new(
                Expr::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                span,
            ));
        }

        Ok(target)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_unary()?;

        loop {
            let precedence = self.infix_precedence();
            if precedence == 0 || precedence < min_precedence {
                break;
            }
            let kind = self.current_token().kind;
            let op = match self.binary_op_for(kind) {
                Some(op) => op,
                None => break,
            };
            self.advance();
            // Left associativity: the right operand only admits operators
            // that bind strictly tighter.
            let right = self.parse_binary(precedence + 1)?;
            let span = left.span.merge(&right.span);
            left = Node::new(
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Node<Expr>> {
        match self.current_token().kind {
            TokenKind::Minus => {
                let start = self.advance().span;
                let operand = self.parse_unary()?;
                let span = start.merge(&operand.span);
                Ok(Node::new(
                    Expr::Unary {
                        op: UnaryOp::Neg,
                        expr: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenKind::Bang => {
                let start = self.advance().span;
                let operand = self.parse_unary()?;
                let span = start.merge(&operand.span);
                Ok(Node::new(
                    Expr::Unary {
                        op: UnaryOp::Not,
                        expr: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenKind::Amp => {
                let start = self.advance().span;
                let mutable = if self.check(TokenKind::Mut) {
                    self.advance();
                    true
                } else {
                    false
                };
                let operand = self.parse_unary()?;
                let span = start.merge(&operand.span);
                Ok(Node::new(
                    Expr::Borrow {
                        mutable,
                        expr: Box::new(operand),
                    },
                    span,
                ))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Postfix chain: field access and method calls bind tightest and may
    /// stack (`a.b.c()`, `f().x`).
    fn parse_postfix(&mut self) -> ParseResult<Node<Expr>> {
        let mut expr = self.parse_primary()?;

        while self.check(TokenKind::Dot) {
            self.advance();
            let member = self.parse_identifier()?;
            if self.check(TokenKind::LParen) {
                let (args, end) = self.parse_args()?;
                let span = expr.span.merge(&end);
                expr = Node::new(
                    Expr::MethodCall {
                        object: Box::new(expr),
                        method: member,
                        args,
                    },
                    span,
                );
            } else {
                let span = expr.span.merge(&member.span);
                expr = Node::new(
                    Expr::Field {
                        object: Box::new(expr),
                        field: member,
                    },
                    span,
                );
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Node<Expr>> {
        let token = self.current_token().clone();
        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value: i64 = token.text.parse().map_err(|_| {
                    crate::error::ParseError::new(
                        "an integer literal in range",
                        format!("`{}`", token.text),
                        token.span,
                    )
                })?;
                Ok(Node::new(Expr::Literal(Literal::Int(value)), token.span))
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let value: f64 = token.text.parse().map_err(|_| {
                    crate::error::ParseError::new(
                        "a float literal",
                        format!("`{}`", token.text),
                        token.span,
                    )
                })?;
                Ok(Node::new(Expr::Literal(Literal::Float(value)), token.span))
            }
            TokenKind::StringLiteral => {
                self.advance();
                Ok(Node::new(
                    Expr::Literal(Literal::Str(token.text)),
                    token.span,
                ))
            }
            TokenKind::True => {
                self.advance();
                Ok(Node::new(Expr::Literal(Literal::Bool(true)), token.span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Node::new(Expr::Literal(Literal::Bool(false)), token.span))
            }
            TokenKind::Identifier => {
                let name = self.parse_identifier()?;
                if self.check(TokenKind::LParen) {
                    let (args, end) = self.parse_args()?;
                    let span = name.span.merge(&end);
                    return Ok(Node::new(Expr::Call { callee: name, args }, span));
                }
                if self.allow_struct_literal && self.check(TokenKind::LBrace) {
                    return self.parse_struct_init(name);
                }
                let span = name.span;
                Ok(Node::new(Expr::Ident(name.value), span))
            }
            TokenKind::LParen => {
                let start = self.advance().span;
                let saved = self.allow_struct_literal;
                self.allow_struct_literal = true;
                let inner = self.parse_expression();
                self.allow_struct_literal = saved;
                let inner = inner?;
                let end = self.consume(TokenKind::RParen, "`)`")?.span;
                Ok(Node::new(Expr::Paren(Box::new(inner)), start.merge(&end)))
            }
            _ => Err(self.error("an expression")),
        }
    }

    /// struct_init := ident "{" (ident ":" expression ",")* "}"
    fn parse_struct_init(
        &mut self,
        name: Node<ztn_ast::Ident>,
    ) -> ParseResult<Node<Expr>> {
        self.consume(TokenKind::LBrace, "`{`")?;
        let mut fields = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let field = self.parse_identifier()?;
            self.consume(TokenKind::Colon, "`:`")?;
            let saved = self.allow_struct_literal;
            self.allow_struct_literal = true;
            let value = self.parse_expression();
            self.allow_struct_literal = saved;
            fields.push((field, value?));
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let end = self.consume(TokenKind::RBrace, "`}`")?.span;
        let span = name.span.merge(&end);
        Ok(Node::new(Expr::StructInit { name, fields }, span))
    }

    /// Parses `( expr, ... )`, returning the arguments and the span of the
    /// closing parenthesis.
    fn parse_args(&mut self) -> ParseResult<(Vec<Node<Expr>>, ztn_ast::Span)> {
        self.consume(TokenKind::LParen, "`(`")?;
        let mut args = Vec::new();
        let saved = self.allow_struct_literal;
        self.allow_struct_literal = true;

        if !self.check(TokenKind::RParen) {
            loop {
                match self.parse_expression() {
                    Ok(arg) => args.push(arg),
                    Err(err) => {
                        self.allow_struct_literal = saved;
                        return Err(err);
                    }
                }
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }

        self.allow_struct_literal = saved;
        let end = self.consume(TokenKind::RParen, "`)`")?.span;
        Ok((args, end))
    }
}

fn is_assign_target(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(_) | Expr::Field { .. })
}
