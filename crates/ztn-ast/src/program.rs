//! Root AST node for one compilation unit

use super::*;

/// A complete parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub decls: Vec<Node<Decl>>,
    pub span: Span,
}
