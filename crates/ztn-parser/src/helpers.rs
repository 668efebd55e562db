//! Token cursor utilities and the operator precedence table

use ztn_ast::{BinaryOp, Ident, Node};
use ztn_lexer::{Token, TokenKind};

use crate::error::ParseError;
use crate::parser::Parser;
use crate::ParseResult;

impl Parser {
    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.current + offset).map(|t| t.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind, expected: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        let token = self.consume(TokenKind::Identifier, "an identifier")?;
        Ok(Node::new(Ident::new(token.text.clone()), token.span))
    }

    pub(crate) fn error(&self, expected: &str) -> ParseError {
        let token = self.current_token();
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Error => format!("invalid input ({})", token.text),
            _ => format!("`{}`", token.text),
        };
        ParseError::new(expected, found, token.span)
    }

    /// Binding power for infix binary operators; 0 means not an operator.
    /// Documented precedence: `||` < `&&` < `==`/`!=` < comparisons <
    /// additive < multiplicative. All left-associative.
    pub(crate) fn infix_precedence(&self) -> u8 {
        match self.current_token().kind {
            TokenKind::PipePipe => 1,
            TokenKind::AmpAmp => 2,
            TokenKind::EqEq | TokenKind::BangEq => 3,
            TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => 4,
            TokenKind::Plus | TokenKind::Minus => 5,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 6,
            _ => 0,
        }
    }

    pub(crate) fn binary_op_for(&self, kind: TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Skips forward to the next statement boundary inside a block:
    /// just past a `;`, or stopping in front of the matching `}`.
    pub(crate) fn recover_in_block(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.current_token().kind {
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skips forward to the next top-level declaration keyword.
    /// Returns false when no further declaration can start.
    pub(crate) fn recover_to_decl(&mut self) -> bool {
        while !self.is_at_end() {
            match self.current_token().kind {
                TokenKind::Fn
                | TokenKind::Struct
                | TokenKind::Class
                | TokenKind::Interface => return true,
                _ => {
                    self.advance();
                }
            }
        }
        false
    }
}
