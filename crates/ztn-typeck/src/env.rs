//! Type environment (scoped symbol table)

use std::collections::HashMap;

use ztn_ast::Span;

use crate::types::Type;

/// What the checker knows about one local binding.
#[derive(Debug, Clone)]
pub struct VarInfo {
    pub ty: Type,
    pub mutable: bool,
    pub decl_span: Span,
    pub used: bool,
    /// Parameters never get unused-binding warnings.
    pub is_param: bool,
}

/// Lexically scoped binding table for one function body.
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    scopes: Vec<HashMap<String, VarInfo>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope and hands back its bindings so the caller
    /// can report the ones that were never read.
    pub fn pop_scope(&mut self) -> Vec<(String, VarInfo)> {
        match self.scopes.pop() {
            Some(scope) => {
                let mut bindings: Vec<(String, VarInfo)> = scope.into_iter().collect();
                bindings.sort_by(|(_, a), (_, b)| a.decl_span.start.cmp(&b.decl_span.start));
                bindings
            }
            None => Vec::new(),
        }
    }

    pub fn declare(&mut self, name: String, info: VarInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, info);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut VarInfo> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(info) = scope.get_mut(name) {
                return Some(info);
            }
        }
        None
    }

    pub fn mark_used(&mut self, name: &str) {
        if let Some(info) = self.lookup_mut(name) {
            info.used = true;
        }
    }
}
