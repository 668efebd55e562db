//! Declaration definitions for the AST

use super::*;

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// Function declaration
    Fn(FnDecl),

    /// Struct declaration
    Struct(StructDecl),

    /// Class declaration
    Class(ClassDecl),

    /// Interface declaration
    Interface(InterfaceDecl),
}

/// Function declaration: `fn name(params) -> Type { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: Node<Ident>,
    pub params: Vec<Param>,
    pub return_type: Node<TypeExpr>,
    pub body: Node<Block>,
}

/// Function or method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Node<Ident>,
    pub ty: Node<TypeExpr>,
}

/// Struct field (also used for class fields)
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Node<Ident>,
    pub ty: Node<TypeExpr>,
}

/// Struct declaration: `struct Name { field: Type, ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Node<Ident>,
    pub fields: Vec<Field>,
}

/// Class declaration:
/// `class Name extends Parent? implements I1, I2? { field; ... method* }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Node<Ident>,
    pub extends: Option<Node<Ident>>,
    pub implements: Vec<Node<Ident>>,
    pub fields: Vec<Field>,
    pub methods: Vec<MethodDecl>,
}

/// Class method: `fn name(params) -> Type { body }` inside a class body
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: Node<Ident>,
    pub params: Vec<Param>,
    pub return_type: Node<TypeExpr>,
    pub body: Node<Block>,
    pub span: Span,
}

/// Interface declaration holding required method signatures
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Node<Ident>,
    pub methods: Vec<MethodSig>,
}

/// Bodiless method signature: `fn name(params) -> Type;`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: Node<Ident>,
    pub params: Vec<Param>,
    pub return_type: Node<TypeExpr>,
    pub span: Span,
}
