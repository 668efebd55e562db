//! Internal type representation

use crate::registry::{Registry, SymbolId};

/// Checker-internal type. `Named` carries the declaring symbol, so two
/// types compare equal exactly when they refer to the same declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    I32,
    F64,
    Bool,
    Str,
    Unit,

    /// Struct, class, or interface by declaration identity.
    Named(SymbolId),

    /// Shared or mutable reference.
    Ref { mutable: bool, inner: Box<Type> },

    /// Function signature (registry entries only; not a first-class value).
    Function { params: Vec<Type>, ret: Box<Type> },

    /// Placeholder produced after an error so one bad expression does not
    /// cascade into mismatch reports on everything that touches it.
    Unknown,
}

impl Type {
    /// Copy semantics: scalar primitives and references duplicate freely;
    /// `String` and named types transfer ownership on by-value use.
    pub fn is_copy(&self) -> bool {
        matches!(
            self,
            Type::I32 | Type::F64 | Type::Bool | Type::Unit | Type::Ref { .. } | Type::Unknown
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::I32 | Type::F64)
    }

    /// Exact equality with `Unknown` matching anything, so error recovery
    /// stays quiet downstream of the first report.
    pub fn matches(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Unknown, _) | (_, Type::Unknown) => true,
            (
                Type::Ref {
                    mutable: m1,
                    inner: i1,
                },
                Type::Ref {
                    mutable: m2,
                    inner: i2,
                },
            ) => m1 == m2 && i1.matches(i2),
            _ => self == other,
        }
    }

    /// One level of reference peeling for member access.
    pub fn deref(&self) -> &Type {
        match self {
            Type::Ref { inner, .. } => inner,
            other => other,
        }
    }

    /// Human-readable rendering; named types need the registry for their
    /// declared name.
    pub fn render(&self, registry: &Registry) -> String {
        match self {
            Type::I32 => "i32".to_string(),
            Type::F64 => "f64".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Str => "String".to_string(),
            Type::Unit => "unit".to_string(),
            Type::Named(id) => registry.name_of(*id).to_string(),
            Type::Ref { mutable, inner } => {
                if *mutable {
                    format!("&mut {}", inner.render(registry))
                } else {
                    format!("&{}", inner.render(registry))
                }
            }
            Type::Function { params, ret } => {
                let params: Vec<String> = params.iter().map(|p| p.render(registry)).collect();
                format!("fn({}) -> {}", params.join(", "), ret.render(registry))
            }
            Type::Unknown => "{unknown}".to_string(),
        }
    }
}
