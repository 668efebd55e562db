//! Surface type expressions

use super::*;
use std::fmt;

/// A type as written in source. Resolution to checker types happens in
/// the registry; the parser only records the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Named type: `i32`, `String`, `Point`. Primitive names are not
    /// reserved words; the registry decides what the name means.
    Name(Ident),

    /// Shared or mutable reference: `&T` / `&mut T`
    Ref {
        mutable: bool,
        inner: Box<Node<TypeExpr>>,
    },
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(ident) => write!(f, "{}", ident),
            TypeExpr::Ref { mutable: true, inner } => write!(f, "&mut {}", inner.value),
            TypeExpr::Ref { mutable: false, inner } => write!(f, "&{}", inner.value),
        }
    }
}
