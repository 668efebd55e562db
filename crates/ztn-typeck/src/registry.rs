//! Symbol/type registry.
//!
//! Two passes over the top-level declarations: pass 1 interns every name as
//! a skeleton so declarations may reference each other in either order,
//! pass 2 resolves the named type references inside fields, signatures,
//! inheritance links, and interface tables.

use std::collections::HashMap;

use ztn_ast::{Decl, Ident, Node, Program, Span, TypeExpr};
use ztn_diag::{DiagCode, Diagnostic, Diagnostics};

use crate::types::Type;

/// Handle into the registry's symbol arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

/// A resolved method signature attached to a class or interface.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Struct {
        fields: Vec<(String, Type)>,
    },
    Class {
        parent: Option<SymbolId>,
        interfaces: Vec<SymbolId>,
        fields: Vec<(String, Type)>,
        methods: Vec<MethodInfo>,
    },
    Interface {
        methods: Vec<MethodInfo>,
    },
    Function {
        params: Vec<Type>,
        ret: Type,
    },

    /// A named type mentioned by an extern signature but declared in some
    /// other unit. Opaque here: no members are known.
    Opaque,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub span: Span,
    pub kind: SymbolKind,
}

/// An externally-visible function from another compilation unit, with its
/// signature written in surface syntax (`i32`, `&mut Point`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct ExternSig {
    pub params: Vec<String>,
    pub ret: String,
}

pub struct Registry {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
}

impl Registry {
    /// Runs both collection passes and reports duplicate declarations,
    /// unresolvable names, and inheritance cycles into `diags`.
    pub fn build(
        program: &Program,
        externs: &HashMap<String, ExternSig>,
        diags: &mut Diagnostics,
    ) -> Self {
        let mut registry = Registry {
            symbols: Vec::new(),
            by_name: HashMap::new(),
        };
        registry.collect_skeletons(program, diags);
        registry.intern_externs(externs);
        registry.resolve(program, externs, diags);
        registry.check_inheritance_cycles(diags);
        registry
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn name_of(&self, id: SymbolId) -> &str {
        &self.symbols[id.0 as usize].name
    }

    /// Own fields plus inherited class fields, parent-first, so struct
    /// literal checking and field lookup see one flattened list.
    pub fn all_fields(&self, id: SymbolId) -> Vec<(String, Type)> {
        match &self.symbol(id).kind {
            SymbolKind::Struct { fields } => fields.clone(),
            SymbolKind::Class { parent, fields, .. } => {
                let mut all = match parent {
                    Some(parent) => self.all_fields(*parent),
                    None => Vec::new(),
                };
                all.extend(fields.iter().cloned());
                all
            }
            _ => Vec::new(),
        }
    }

    pub fn field_type(&self, id: SymbolId, field: &str) -> Option<Type> {
        self.all_fields(id)
            .into_iter()
            .find(|(name, _)| name == field)
            .map(|(_, ty)| ty)
    }

    /// Method lookup on a class checks its own methods first, then the
    /// parent chain. Interfaces answer with their required signatures.
    pub fn find_method(&self, id: SymbolId, name: &str) -> Option<MethodInfo> {
        match &self.symbol(id).kind {
            SymbolKind::Class {
                parent, methods, ..
            } => methods
                .iter()
                .find(|m| m.name == name)
                .cloned()
                .or_else(|| parent.and_then(|p| self.find_method(p, name))),
            SymbolKind::Interface { methods } => {
                methods.iter().find(|m| m.name == name).cloned()
            }
            _ => None,
        }
    }

    pub fn parent_of(&self, id: SymbolId) -> Option<SymbolId> {
        match &self.symbol(id).kind {
            SymbolKind::Class { parent, .. } => *parent,
            _ => None,
        }
    }

    /// Resolves a surface type expression. Unresolvable names report
    /// `UnknownType` and come back as `Unknown` so checking continues.
    pub fn resolve_type(&self, ty: &Node<TypeExpr>, diags: &mut Diagnostics) -> Type {
        match &ty.value {
            TypeExpr::Name(ident) => self.resolve_type_name(&ident.name, ty.span, diags),
            TypeExpr::Ref { mutable, inner } => Type::Ref {
                mutable: *mutable,
                inner: Box::new(self.resolve_type(inner, diags)),
            },
        }
    }

    fn resolve_type_name(&self, name: &str, span: Span, diags: &mut Diagnostics) -> Type {
        match name {
            "i32" => Type::I32,
            "f64" => Type::F64,
            "bool" => Type::Bool,
            "String" => Type::Str,
            "unit" => Type::Unit,
            _ => match self.lookup(name) {
                Some(id) => Type::Named(id),
                None => {
                    diags.push(Diagnostic::error(
                        DiagCode::UnknownType,
                        format!("unknown type `{}`", name),
                        span,
                    ));
                    Type::Unknown
                }
            },
        }
    }

    fn collect_skeletons(&mut self, program: &Program, diags: &mut Diagnostics) {
        for decl in &program.decls {
            let (name, kind) = match &decl.value {
                Decl::Fn(f) => (
                    &f.name,
                    SymbolKind::Function {
                        params: Vec::new(),
                        ret: Type::Unknown,
                    },
                ),
                Decl::Struct(s) => (&s.name, SymbolKind::Struct { fields: Vec::new() }),
                Decl::Class(c) => (
                    &c.name,
                    SymbolKind::Class {
                        parent: None,
                        interfaces: Vec::new(),
                        fields: Vec::new(),
                        methods: Vec::new(),
                    },
                ),
                Decl::Interface(i) => (
                    &i.name,
                    SymbolKind::Interface {
                        methods: Vec::new(),
                    },
                ),
            };
            self.intern(name, kind, diags);
        }
    }

    fn intern(&mut self, name: &Node<Ident>, kind: SymbolKind, diags: &mut Diagnostics) {
        if let Some(existing) = self.lookup(&name.value.name) {
            let first_span = self.symbol(existing).span;
            diags.push(
                Diagnostic::error(
                    DiagCode::DuplicateDeclaration,
                    format!("`{}` is declared more than once", name.value.name),
                    name.span,
                )
                .with_note(first_span, "first declared here"),
            );
            return;
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.value.name.clone(),
            span: name.span,
            kind,
        });
        self.by_name.insert(self.symbols[id.0 as usize].name.clone(), id);
    }

    /// Extern functions join the table unless the unit declares the same
    /// name itself; the local declaration wins.
    fn intern_externs(&mut self, externs: &HashMap<String, ExternSig>) {
        let mut names: Vec<&String> = externs.keys().collect();
        names.sort();
        for name in names {
            if self.by_name.contains_key(name) {
                continue;
            }
            let id = SymbolId(self.symbols.len() as u32);
            self.symbols.push(Symbol {
                name: name.clone(),
                span: Span::new(0, 0, usize::MAX),
                kind: SymbolKind::Function {
                    params: Vec::new(),
                    ret: Type::Unknown,
                },
            });
            self.by_name.insert(name.clone(), id);
        }
    }

    fn resolve(
        &mut self,
        program: &Program,
        externs: &HashMap<String, ExternSig>,
        diags: &mut Diagnostics,
    ) {
        for decl in &program.decls {
            match &decl.value {
                Decl::Fn(f) => {
                    let params: Vec<Type> = f
                        .params
                        .iter()
                        .map(|p| self.resolve_type(&p.ty, diags))
                        .collect();
                    let ret = self.resolve_type(&f.return_type, diags);
                    if let Some(id) = self.owning_symbol(&f.name) {
                        self.symbols[id.0 as usize].kind = SymbolKind::Function { params, ret };
                    }
                }
                Decl::Struct(s) => {
                    let fields: Vec<(String, Type)> = s
                        .fields
                        .iter()
                        .map(|f| (f.name.value.name.clone(), self.resolve_type(&f.ty, diags)))
                        .collect();
                    if let Some(id) = self.owning_symbol(&s.name) {
                        self.symbols[id.0 as usize].kind = SymbolKind::Struct { fields };
                    }
                }
                Decl::Class(c) => {
                    let parent = c.extends.as_ref().and_then(|parent| {
                        self.resolve_class_ref(parent, diags)
                    });
                    let interfaces: Vec<SymbolId> = c
                        .implements
                        .iter()
                        .filter_map(|i| self.resolve_interface_ref(i, diags))
                        .collect();
                    let fields: Vec<(String, Type)> = c
                        .fields
                        .iter()
                        .map(|f| (f.name.value.name.clone(), self.resolve_type(&f.ty, diags)))
                        .collect();
                    let methods: Vec<MethodInfo> = c
                        .methods
                        .iter()
                        .map(|m| MethodInfo {
                            name: m.name.value.name.clone(),
                            params: m
                                .params
                                .iter()
                                .map(|p| self.resolve_type(&p.ty, diags))
                                .collect(),
                            ret: self.resolve_type(&m.return_type, diags),
                            span: m.span,
                        })
                        .collect();
                    if let Some(id) = self.owning_symbol(&c.name) {
                        self.symbols[id.0 as usize].kind = SymbolKind::Class {
                            parent,
                            interfaces,
                            fields,
                            methods,
                        };
                    }
                }
                Decl::Interface(i) => {
                    let methods: Vec<MethodInfo> = i
                        .methods
                        .iter()
                        .map(|m| MethodInfo {
                            name: m.name.value.name.clone(),
                            params: m
                                .params
                                .iter()
                                .map(|p| self.resolve_type(&p.ty, diags))
                                .collect(),
                            ret: self.resolve_type(&m.return_type, diags),
                            span: m.span,
                        })
                        .collect();
                    if let Some(id) = self.owning_symbol(&i.name) {
                        self.symbols[id.0 as usize].kind = SymbolKind::Interface { methods };
                    }
                }
            }
        }

        self.resolve_extern_sigs(externs);
    }

    /// Only the declaration that won the name owns the registry slot;
    /// a rejected duplicate must not overwrite the winner's contents.
    fn owning_symbol(&self, name: &Node<Ident>) -> Option<SymbolId> {
        self.lookup(&name.value.name)
            .filter(|id| self.symbol(*id).span == name.span)
    }

    fn resolve_class_ref(
        &self,
        name: &Node<Ident>,
        diags: &mut Diagnostics,
    ) -> Option<SymbolId> {
        match self.lookup(&name.value.name) {
            Some(id) if matches!(self.symbol(id).kind, SymbolKind::Class { .. }) => Some(id),
            Some(_) => {
                diags.push(Diagnostic::error(
                    DiagCode::TypeMismatch,
                    format!("`{}` is not a class and cannot be extended", name.value.name),
                    name.span,
                ));
                None
            }
            None => {
                diags.push(Diagnostic::error(
                    DiagCode::UnknownType,
                    format!("unknown type `{}`", name.value.name),
                    name.span,
                ));
                None
            }
        }
    }

    fn resolve_interface_ref(
        &self,
        name: &Node<Ident>,
        diags: &mut Diagnostics,
    ) -> Option<SymbolId> {
        match self.lookup(&name.value.name) {
            Some(id) if matches!(self.symbol(id).kind, SymbolKind::Interface { .. }) => Some(id),
            Some(_) => {
                diags.push(Diagnostic::error(
                    DiagCode::TypeMismatch,
                    format!(
                        "`{}` is not an interface and cannot be implemented",
                        name.value.name
                    ),
                    name.span,
                ));
                None
            }
            None => {
                diags.push(Diagnostic::error(
                    DiagCode::UnknownType,
                    format!("unknown type `{}`", name.value.name),
                    name.span,
                ));
                None
            }
        }
    }

    /// Extern signatures are written as surface type names. Named types
    /// not declared in this unit become opaque symbols.
    fn resolve_extern_sigs(&mut self, externs: &HashMap<String, ExternSig>) {
        let mut names: Vec<String> = externs.keys().cloned().collect();
        names.sort();
        for name in names {
            let Some(id) = self.lookup(&name) else { continue };
            if self.symbol(id).span != Span::new(0, 0, usize::MAX) {
                // Shadowed by a local declaration.
                continue;
            }
            let sig = externs[&name].clone();
            let params: Vec<Type> = sig
                .params
                .iter()
                .map(|p| self.resolve_surface_name(p))
                .collect();
            let ret = self.resolve_surface_name(&sig.ret);
            self.symbols[id.0 as usize].kind = SymbolKind::Function { params, ret };
        }
    }

    fn resolve_surface_name(&mut self, written: &str) -> Type {
        let written = written.trim();
        if let Some(rest) = written.strip_prefix("&mut ") {
            return Type::Ref {
                mutable: true,
                inner: Box::new(self.resolve_surface_name(rest)),
            };
        }
        if let Some(rest) = written.strip_prefix('&') {
            return Type::Ref {
                mutable: false,
                inner: Box::new(self.resolve_surface_name(rest)),
            };
        }
        match written {
            "i32" => Type::I32,
            "f64" => Type::F64,
            "bool" => Type::Bool,
            "String" => Type::Str,
            "unit" => Type::Unit,
            name => {
                if let Some(id) = self.lookup(name) {
                    return Type::Named(id);
                }
                let id = SymbolId(self.symbols.len() as u32);
                self.symbols.push(Symbol {
                    name: name.to_string(),
                    span: Span::new(0, 0, usize::MAX),
                    kind: SymbolKind::Opaque,
                });
                self.by_name.insert(name.to_string(), id);
                Type::Named(id)
            }
        }
    }

    /// Walks every class's parent chain; a repeated symbol means a cycle.
    /// The offending link is cut so later phases always terminate.
    fn check_inheritance_cycles(&mut self, diags: &mut Diagnostics) {
        let class_ids: Vec<SymbolId> = (0..self.symbols.len() as u32)
            .map(SymbolId)
            .filter(|id| matches!(self.symbol(*id).kind, SymbolKind::Class { .. }))
            .collect();

        for id in class_ids {
            let mut seen = vec![id];
            let mut cursor = self.parent_of(id);
            while let Some(parent) = cursor {
                if seen.contains(&parent) {
                    let symbol = self.symbol(id);
                    diags.push(Diagnostic::error(
                        DiagCode::InheritanceCycle,
                        format!("inheritance cycle involving class `{}`", symbol.name),
                        symbol.span,
                    ));
                    if let SymbolKind::Class { parent, .. } =
                        &mut self.symbols[id.0 as usize].kind
                    {
                        *parent = None;
                    }
                    break;
                }
                seen.push(parent);
                cursor = self.parent_of(parent);
            }
        }
    }
}
