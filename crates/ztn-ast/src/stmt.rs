//! Statement definitions for the AST

use super::*;

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Let binding: `let mut? name: Type? = value;`
    Let(LetStmt),

    /// Return statement: `return expr?;`
    Return(Option<Node<Expr>>),

    /// If statement with optional else branch
    If {
        condition: Node<Expr>,
        then_block: Node<Block>,
        else_block: Option<Node<Block>>,
    },

    /// While loop
    While {
        condition: Node<Expr>,
        body: Node<Block>,
    },

    /// Expression statement: `expr;`
    Expr(Node<Expr>),

    /// Nested block: `{ stmts }`
    Block(Node<Block>),
}

/// Block of statements
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Node<Stmt>>,
}

/// Let binding
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub name: Node<Ident>,
    pub mutable: bool,
    pub ty: Option<Node<TypeExpr>>,
    pub init: Node<Expr>,
}
