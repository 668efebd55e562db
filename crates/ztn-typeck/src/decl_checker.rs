//! Class checking: interface conformance, override signatures, method bodies.

use ztn_ast::ClassDecl;
use ztn_diag::{DiagCode, Diagnostic, Diagnostics};

use crate::checker::TypeChecker;
use crate::registry::{MethodInfo, SymbolId, SymbolKind};
use crate::typed_ast::TypedFn;
use crate::types::Type;

impl<'a> TypeChecker<'a> {
    pub(crate) fn check_class_decl(&mut self, c: &ClassDecl, out: &mut Vec<TypedFn>) {
        let Some(id) = self.owning_class(c) else {
            // A rejected duplicate: its methods are still checked so body
            // errors surface, but conformance is judged on the winner only.
            self.check_method_bodies(c, None, out);
            return;
        };

        self.check_interface_conformance(c, id);
        self.check_overrides(c, id);
        self.check_method_bodies(c, Some(id), out);
    }

    fn owning_class(&self, c: &ClassDecl) -> Option<SymbolId> {
        let id = self.registry.lookup(&c.name.value.name)?;
        let symbol = self.registry.symbol(id);
        if symbol.span == c.name.span && matches!(symbol.kind, SymbolKind::Class { .. }) {
            Some(id)
        } else {
            None
        }
    }

    /// Every interface the class claims must be satisfied method-for-method
    /// with an identical signature, searched through the parent chain.
    fn check_interface_conformance(&mut self, c: &ClassDecl, id: SymbolId) {
        let SymbolKind::Class { interfaces, .. } = &self.registry.symbol(id).kind else {
            return;
        };

        for iface_id in interfaces {
            let SymbolKind::Interface { methods } = &self.registry.symbol(*iface_id).kind
            else {
                continue;
            };
            let iface_name = self.registry.name_of(*iface_id);

            for required in methods {
                match self.registry.find_method(id, &required.name) {
                    None => {
                        self.diags.push(Diagnostic::error(
                            DiagCode::InterfaceNotSatisfied,
                            format!(
                                "class `{}` does not satisfy interface `{}`: missing method `{}`",
                                c.name.value.name, iface_name, required.name
                            ),
                            c.name.span,
                        ));
                    }
                    Some(found) if !signatures_match(&found, required) => {
                        self.diags.push(
                            Diagnostic::error(
                                DiagCode::InterfaceNotSatisfied,
                                format!(
                                    "class `{}` does not satisfy interface `{}`: method `{}` has a different signature",
                                    c.name.value.name, iface_name, required.name
                                ),
                                found.span,
                            )
                            .with_note(required.span, "required signature declared here"),
                        );
                    }
                    Some(_) => {}
                }
            }
        }
    }

    /// Overriding a parent method requires the identical signature; there is
    /// no covariant or contravariant relaxation.
    fn check_overrides(&mut self, c: &ClassDecl, id: SymbolId) {
        let Some(parent) = self.registry.parent_of(id) else {
            return;
        };

        let SymbolKind::Class { methods, .. } = &self.registry.symbol(id).kind else {
            return;
        };

        for method in methods {
            if let Some(inherited) = self.registry.find_method(parent, &method.name) {
                if !signatures_match(method, &inherited) {
                    self.diags.push(
                        Diagnostic::error(
                            DiagCode::SignatureMismatch,
                            format!(
                                "method `{}` overrides an inherited method with a different signature",
                                method.name
                            ),
                            method.span,
                        )
                        .with_note(inherited.span, "inherited method declared here"),
                    );
                }
            }
        }
    }

    fn check_method_bodies(
        &mut self,
        c: &ClassDecl,
        id: Option<SymbolId>,
        out: &mut Vec<TypedFn>,
    ) {
        for method in &c.methods {
            let (param_types, ret) = self.method_signature(id, method);
            out.push(self.check_function(
                &method.name,
                id,
                &method.params,
                &param_types,
                ret,
                &method.body,
            ));
        }
    }

    fn method_signature(
        &mut self,
        id: Option<SymbolId>,
        method: &ztn_ast::MethodDecl,
    ) -> (Vec<Type>, Type) {
        if let Some(id) = id {
            if let SymbolKind::Class { methods, .. } = &self.registry.symbol(id).kind {
                if let Some(info) = methods
                    .iter()
                    .find(|m| m.name == method.name.value.name && m.span == method.span)
                {
                    return (info.params.clone(), info.ret.clone());
                }
            }
        }
        let mut scratch = Diagnostics::new();
        let params = method
            .params
            .iter()
            .map(|p| self.registry.resolve_type(&p.ty, &mut scratch))
            .collect();
        let ret = self.registry.resolve_type(&method.return_type, &mut scratch);
        (params, ret)
    }
}

fn signatures_match(a: &MethodInfo, b: &MethodInfo) -> bool {
    a.params.len() == b.params.len()
        && a.params.iter().zip(&b.params).all(|(x, y)| x == y)
        && a.ret == b.ret
}
