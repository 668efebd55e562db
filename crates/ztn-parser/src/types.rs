use ztn_ast::{Node, TypeExpr};
use ztn_lexer::TokenKind;

use crate::parser::Parser;
use crate::ParseResult;

impl Parser {
    /// type := '&' 'mut'? type | identifier
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<TypeExpr>> {
        if self.check(TokenKind::Amp) {
            let start = self.advance().span;
            let mutable = if self.check(TokenKind::Mut) {
                self.advance();
                true
            } else {
                false
            };
            let inner = self.parse_type()?;
            let span = start.merge(&inner.span);
            return Ok(Node::new(
                TypeExpr::Ref {
                    mutable,
                    inner: Box::new(inner),
                },
                span,
            ));
        }

        let name = self.parse_identifier()?;
        let span = name.span;
        Ok(Node::new(TypeExpr::Name(name.value), span))
    }
}
