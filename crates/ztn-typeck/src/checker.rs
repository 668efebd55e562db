//! Main type checker struct

use ztn_ast::{Block, Decl, FnDecl, Ident, Node, Param, Program};
use ztn_diag::{DiagCode, Diagnostic, Diagnostics};

use crate::env::{TypeEnv, VarInfo};
use crate::registry::{Registry, SymbolId, SymbolKind};
use crate::typed_ast::{TypedBlock, TypedFn, TypedParam, TypedProgram};
use crate::types::Type;

/// Checks every function and method body against the registry, producing
/// the typed program plus accumulated diagnostics.
pub struct TypeChecker<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) env: TypeEnv,
    pub(crate) diags: Diagnostics,
    /// Declared return type of the function currently being checked.
    pub(crate) current_return_type: Type,
}

impl<'a> TypeChecker<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            env: TypeEnv::new(),
            diags: Diagnostics::new(),
            current_return_type: Type::Unit,
        }
    }

    pub fn check_program(mut self, program: &Program) -> (TypedProgram, Diagnostics) {
        let mut functions = Vec::new();

        for decl in &program.decls {
            match &decl.value {
                Decl::Fn(f) => functions.push(self.check_fn_decl(f)),
                Decl::Class(c) => {
                    self.check_class_decl(c, &mut functions);
                }
                Decl::Struct(_) | Decl::Interface(_) => {}
            }
        }

        (TypedProgram { functions }, self.diags)
    }

    fn check_fn_decl(&mut self, f: &FnDecl) -> TypedFn {
        let (param_types, ret) = self.fn_signature(f);
        self.check_function(&f.name, None, &f.params, &param_types, ret, &f.body)
    }

    /// Pass 2 already resolved every top-level signature; reuse it rather
    /// than re-resolving, so `UnknownType` is reported once per mention.
    fn fn_signature(&mut self, f: &FnDecl) -> (Vec<Type>, Type) {
        if let Some(id) = self.registry.lookup(&f.name.value.name) {
            let symbol = self.registry.symbol(id);
            if symbol.span == f.name.span {
                if let SymbolKind::Function { params, ret } = &symbol.kind {
                    return (params.clone(), ret.clone());
                }
            }
        }
        // A rejected duplicate: resolve quietly against the registry.
        let mut scratch = Diagnostics::new();
        let params = f
            .params
            .iter()
            .map(|p| self.registry.resolve_type(&p.ty, &mut scratch))
            .collect();
        let ret = self.registry.resolve_type(&f.return_type, &mut scratch);
        (params, ret)
    }

    pub(crate) fn check_function(
        &mut self,
        name: &Node<Ident>,
        owner: Option<SymbolId>,
        params: &[Param],
        param_types: &[Type],
        ret: Type,
        body: &Node<Block>,
    ) -> TypedFn {
        self.env = TypeEnv::new();
        self.current_return_type = ret.clone();

        let mut typed_params = Vec::new();
        for (param, ty) in params.iter().zip(param_types) {
            self.env.declare(
                param.name.value.name.clone(),
                VarInfo {
                    ty: ty.clone(),
                    mutable: false,
                    decl_span: param.name.span,
                    used: false,
                    is_param: true,
                },
            );
            typed_params.push(TypedParam {
                name: param.name.value.name.clone(),
                ty: ty.clone(),
                span: param.name.span,
            });
        }

        let typed_body = self.check_block(body);

        TypedFn {
            name: name.value.name.clone(),
            owner,
            params: typed_params,
            ret,
            body: typed_body,
            span: name.span,
        }
    }

    pub(crate) fn check_block(&mut self, block: &Node<Block>) -> TypedBlock {
        self.env.push_scope();
        let stmts = block
            .value
            .stmts
            .iter()
            .map(|stmt| self.check_stmt(stmt))
            .collect();
        self.report_unused();
        TypedBlock {
            stmts,
            span: block.span,
        }
    }

    fn report_unused(&mut self) {
        for (name, info) in self.env.pop_scope() {
            if !info.used && !info.is_param {
                self.diags.push(Diagnostic::warning(
                    DiagCode::UnusedBinding,
                    format!("unused binding `{}`", name),
                    info.decl_span,
                ));
            }
        }
    }
}
