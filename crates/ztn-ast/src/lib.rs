//! # Zetan AST
//!
//! Abstract syntax tree definitions for the Zetan compiler front end.
//! Nodes own their children exclusively; the tree shape is enforced by
//! construction.

use std::fmt;

/// Source location information (byte offsets into a compilation unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }
}

/// AST node wrapper that includes span information.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub mod decl;
pub mod expr;
pub mod pretty;
pub mod program;
pub mod stmt;
pub mod types;

pub use decl::*;
pub use expr::*;
pub use pretty::print_program;
pub use program::*;
pub use stmt::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::new(0, 0, 0)
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(3, 7, 0);
        let b = Span::new(5, 12, 0);
        assert_eq!(a.merge(&b), Span::new(3, 12, 0));
        assert_eq!(b.merge(&a), Span::new(3, 12, 0));
    }

    #[test]
    fn test_binary_op_display() {
        assert_eq!(format!("{}", BinaryOp::Add), "+");
        assert_eq!(format!("{}", BinaryOp::NotEq), "!=");
        assert_eq!(format!("{}", BinaryOp::And), "&&");
    }

    #[test]
    fn test_expressions() {
        let literal = Expr::Literal(Literal::Int(42));
        assert!(matches!(literal, Expr::Literal(Literal::Int(42))));

        let ident = Expr::Ident(Ident::new("x"));
        assert!(matches!(ident, Expr::Ident(_)));
    }

    #[test]
    fn test_struct_decl() {
        let decl = StructDecl {
            name: Node::new(Ident::new("Point"), dummy_span()),
            fields: vec![
                Field {
                    name: Node::new(Ident::new("x"), dummy_span()),
                    ty: Node::new(TypeExpr::Name(Ident::new("i32")), dummy_span()),
                },
                Field {
                    name: Node::new(Ident::new("y"), dummy_span()),
                    ty: Node::new(TypeExpr::Name(Ident::new("i32")), dummy_span()),
                },
            ],
        };
        assert_eq!(decl.name.value.name, "Point");
        assert_eq!(decl.fields.len(), 2);
    }

    #[test]
    fn test_fn_decl() {
        let func = FnDecl {
            name: Node::new(Ident::new("main"), dummy_span()),
            params: vec![],
            return_type: Node::new(TypeExpr::Name(Ident::new("i32")), dummy_span()),
            body: Node::new(Block { stmts: vec![] }, dummy_span()),
        };
        assert_eq!(func.name.value.name, "main");
        assert!(func.params.is_empty());
    }

    #[test]
    fn test_borrow_expr() {
        let borrow = Expr::Borrow {
            mutable: true,
            expr: Box::new(Node::new(Expr::Ident(Ident::new("v")), dummy_span())),
        };
        assert!(matches!(borrow, Expr::Borrow { mutable: true, .. }));
    }
}
