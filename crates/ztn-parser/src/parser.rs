use ztn_ast::{Node, Program, Span};
use ztn_diag::Diagnostics;
use ztn_lexer::{Lexer, Token, TokenKind};

use crate::ParseResult;

pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    pub(crate) diags: Diagnostics,
    /// Struct literals are disallowed directly in `if`/`while` condition
    /// position so that `if x { ... }` parses the brace as the body.
    pub(crate) allow_struct_literal: bool,
    file_id: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self::with_file_id(source, 0)
    }

    pub fn with_file_id(source: &str, file_id: usize) -> Self {
        let mut lexer = Lexer::with_file_id(source, file_id);
        let tokens = lexer.tokenize();
        let diags = lexer.take_diagnostics();
        Parser {
            tokens,
            current: 0,
            diags,
            allow_struct_literal: true,
            file_id,
        }
    }

    /// Parses a whole translation unit. Lexical diagnostics gathered during
    /// tokenization are carried into the returned sink alongside any syntax
    /// errors; the program contains every declaration that parsed cleanly.
    pub fn parse_program(mut self) -> (Program, Diagnostics) {
        let mut decls = Vec::new();
        let start = self.current_token().span;

        while !self.is_at_end() {
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(err) => {
                    self.diags.push(err.into_diagnostic());
                    if !self.recover_to_decl() {
                        break;
                    }
                }
            }
        }

        let end = self.previous_token().span;
        let span = if decls.is_empty() {
            Span::new(0, 0, self.file_id)
        } else {
            start.merge(&end)
        };
        (Program { decls, span }, self.diags)
    }

    pub(crate) fn parse_decl(&mut self) -> ParseResult<Node<ztn_ast::Decl>> {
        match self.current_token().kind {
            TokenKind::Fn => self.parse_fn_decl(),
            TokenKind::Struct => self.parse_struct_decl(),
            TokenKind::Class => self.parse_class_decl(),
            TokenKind::Interface => self.parse_interface_decl(),
            _ => Err(self.error("a declaration (`fn`, `struct`, `class`, or `interface`)")),
        }
    }
}
