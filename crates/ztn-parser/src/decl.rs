//! Top-level declaration parsing: functions, structs, classes, interfaces.

use ztn_ast::{
    ClassDecl, Decl, Field, FnDecl, InterfaceDecl, MethodDecl, MethodSig, Node, Param, StructDecl,
};
use ztn_lexer::TokenKind;

use crate::parser::Parser;
use crate::ParseResult;

impl Parser {
    /// function_decl := "fn" ident "(" params? ")" "->" type block
    pub(crate) fn parse_fn_decl(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.consume(TokenKind::Fn, "`fn`")?.span;
        let name = self.parse_identifier()?;
        let params = self.parse_params()?;
        self.consume(TokenKind::Arrow, "`->`")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(Node::new(
            Decl::Fn(FnDecl {
                name,
                params,
                return_type,
                body,
            }),
            span,
        ))
    }

    pub(crate) fn parse_struct_decl(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.consume(TokenKind::Struct, "`struct`")?.span;
        let name = self.parse_identifier()?;
        self.consume(TokenKind::LBrace, "`{`")?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            fields.push(self.parse_field()?);
            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.consume(TokenKind::RBrace, "`}`")?.span;
        let span = start.merge(&end);
        Ok(Node::new(Decl::Struct(StructDecl { name, fields }), span))
    }

    pub(crate) fn parse_class_decl(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.consume(TokenKind::Class, "`class`")?.span;
        let name = self.parse_identifier()?;

        let extends = if self.check(TokenKind::Extends) {
            self.advance();
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let mut implements = Vec::new();
        if self.check(TokenKind::Implements) {
            self.advance();
            implements.push(self.parse_identifier()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                implements.push(self.parse_identifier()?);
            }
        }

        self.consume(TokenKind::LBrace, "`{`")?;

        // Fields come first (`name: Type;`), then methods. A field is
        // recognized by the `ident :` lookahead so the two sections cannot
        // be confused.
        let mut fields = Vec::new();
        while self.check(TokenKind::Identifier)
            && self.peek_kind(1) == Some(TokenKind::Colon)
        {
            fields.push(self.parse_field()?);
            self.consume(TokenKind::Semicolon, "`;`")?;
        }

        let mut methods = Vec::new();
        while self.check(TokenKind::Fn) {
            methods.push(self.parse_method()?);
        }

        let end = self.consume(TokenKind::RBrace, "`}`")?.span;
        let span = start.merge(&end);
        Ok(Node::new(
            Decl::Class(ClassDecl {
                name,
                extends,
                implements,
                fields,
                methods,
            }),
            span,
        ))
    }

    pub(crate) fn parse_interface_decl(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.consume(TokenKind::Interface, "`interface`")?.span;
        let name = self.parse_identifier()?;
        self.consume(TokenKind::LBrace, "`{`")?;

        let mut methods = Vec::new();
        while self.check(TokenKind::Fn) {
            let sig_start = self.advance().span;
            let name = self.parse_identifier()?;
            let params = self.parse_params()?;
            self.consume(TokenKind::Arrow, "`->`")?;
            let return_type = self.parse_type()?;
            let end = self.consume(TokenKind::Semicolon, "`;`")?.span;
            methods.push(MethodSig {
                name,
                params,
                return_type,
                span: sig_start.merge(&end),
            });
        }

        let end = self.consume(TokenKind::RBrace, "`}`")?.span;
        let span = start.merge(&end);
        Ok(Node::new(
            Decl::Interface(InterfaceDecl { name, methods }),
            span,
        ))
    }

    fn parse_method(&mut self) -> ParseResult<MethodDecl> {
        let start = self.consume(TokenKind::Fn, "`fn`")?.span;
        let name = self.parse_identifier()?;
        let params = self.parse_params()?;
        self.consume(TokenKind::Arrow, "`->`")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;
        let span = start.merge(&body.span);
        Ok(MethodDecl {
            name,
            params,
            return_type,
            body,
            span,
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.consume(TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let name = self.parse_identifier()?;
                self.consume(TokenKind::Colon, "`:`")?;
                let ty = self.parse_type()?;
                params.push(Param { name, ty });
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.consume(TokenKind::RParen, "`)`")?;
        Ok(params)
    }

    fn parse_field(&mut self) -> ParseResult<Field> {
        let name = self.parse_identifier()?;
        self.consume(TokenKind::Colon, "`:`")?;
        let ty = self.parse_type()?;
        Ok(Field { name, ty })
    }
}
