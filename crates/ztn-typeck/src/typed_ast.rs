//! Typed program representation.
//!
//! The checker's output: the same tree shape as the surface AST with a
//! `Type` on every expression, names resolved, and grouping parentheses
//! collapsed. This is what the ownership checker walks and what a backend
//! would consume.

use ztn_ast::{BinaryOp, Literal, Span, UnaryOp};

use crate::registry::SymbolId;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct TypedProgram {
    /// Free functions followed by class methods, in declaration order.
    pub functions: Vec<TypedFn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedFn {
    pub name: String,
    /// The declaring class for methods, `None` for free functions.
    pub owner: Option<SymbolId>,
    pub params: Vec<TypedParam>,
    pub ret: Type,
    pub body: TypedBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedParam {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedBlock {
    pub stmts: Vec<TypedStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedStmt {
    Let {
        name: String,
        name_span: Span,
        mutable: bool,
        ty: Type,
        init: TypedExpr,
        span: Span,
    },
    Return {
        value: Option<TypedExpr>,
        span: Span,
    },
    If {
        condition: TypedExpr,
        then_block: TypedBlock,
        else_block: Option<TypedBlock>,
        span: Span,
    },
    While {
        condition: TypedExpr,
        body: TypedBlock,
        span: Span,
    },
    Expr(TypedExpr),
    Block(TypedBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExprKind {
    Literal(Literal),
    Ident(String),
    Binary {
        left: Box<TypedExpr>,
        op: BinaryOp,
        right: Box<TypedExpr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<TypedExpr>,
    },
    Borrow {
        mutable: bool,
        expr: Box<TypedExpr>,
    },
    Assign {
        target: Box<TypedExpr>,
        value: Box<TypedExpr>,
    },
    Call {
        callee: String,
        /// Declared parameter types, kept for a consuming backend.
        param_types: Vec<Type>,
        args: Vec<TypedExpr>,
    },
    Field {
        object: Box<TypedExpr>,
        field: String,
    },
    MethodCall {
        object: Box<TypedExpr>,
        method: String,
        param_types: Vec<Type>,
        args: Vec<TypedExpr>,
    },
    StructInit {
        symbol: SymbolId,
        fields: Vec<(String, TypedExpr)>,
    },

    /// Produced when checking already failed; carries no semantics.
    Poisoned,
}

impl TypedExpr {
    pub fn poisoned(span: Span) -> Self {
        TypedExpr {
            kind: TypedExprKind::Poisoned,
            ty: Type::Unknown,
            span,
        }
    }
}
