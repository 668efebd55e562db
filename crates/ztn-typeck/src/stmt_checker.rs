//! Statement checking

use ztn_ast::{Node, Stmt};
use ztn_diag::{DiagCode, Diagnostic};

use crate::checker::TypeChecker;
use crate::env::VarInfo;
use crate::typed_ast::{TypedExpr, TypedStmt};
use crate::types::Type;

impl<'a> TypeChecker<'a> {
    pub(crate) fn check_stmt(&mut self, stmt: &Node<Stmt>) -> TypedStmt {
        match &stmt.value {
            Stmt::Let(let_stmt) => {
                let init = self.check_expr(&let_stmt.init);

                let ty = match &let_stmt.ty {
                    Some(annotation) => {
                        let declared = self.registry.resolve_type(annotation, &mut self.diags);
                        if !declared.matches(&init.ty) {
                            self.diags.push(Diagnostic::error(
                                DiagCode::TypeMismatch,
                                format!(
                                    "expected `{}`, found `{}`",
                                    declared.render(self.registry),
                                    init.ty.render(self.registry)
                                ),
                                init.span,
                            ));
                        }
                        declared
                    }
                    None => init.ty.clone(),
                };

                self.env.declare(
                    let_stmt.name.value.name.clone(),
                    VarInfo {
                        ty: ty.clone(),
                        mutable: let_stmt.mutable,
                        decl_span: let_stmt.name.span,
                        used: false,
                        is_param: false,
                    },
                );

                TypedStmt::Let {
                    name: let_stmt.name.value.name.clone(),
                    name_span: let_stmt.name.span,
                    mutable: let_stmt.mutable,
                    ty,
                    init,
                    span: stmt.span,
                }
            }

            Stmt::Return(value) => {
                let typed_value = value.as_ref().map(|expr| self.check_expr(expr));
                let actual = typed_value
                    .as_ref()
                    .map(|v| v.ty.clone())
                    .unwrap_or(Type::Unit);
                if !actual.matches(&self.current_return_type) {
                    self.diags.push(Diagnostic::error(
                        DiagCode::TypeMismatch,
                        format!(
                            "return type mismatch: expected `{}`, found `{}`",
                            self.current_return_type.render(self.registry),
                            actual.render(self.registry)
                        ),
                        stmt.span,
                    ));
                }
                TypedStmt::Return {
                    value: typed_value,
                    span: stmt.span,
                }
            }

            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                let condition = self.check_condition(condition);
                let then_block = self.check_block(then_block);
                let else_block = else_block.as_ref().map(|b| self.check_block(b));
                TypedStmt::If {
                    condition,
                    then_block,
                    else_block,
                    span: stmt.span,
                }
            }

            Stmt::While { condition, body } => {
                let condition = self.check_condition(condition);
                let body = self.check_block(body);
                TypedStmt::While {
                    condition,
                    body,
                    span: stmt.span,
                }
            }

            Stmt::Expr(expr) => TypedStmt::Expr(self.check_expr(expr)),

            Stmt::Block(block) => TypedStmt::Block(self.check_block(block)),
        }
    }

    fn check_condition(&mut self, condition: &Node<ztn_ast::Expr>) -> TypedExpr {
        let typed = self.check_expr(condition);
        if !typed.ty.matches(&Type::Bool) {
            self.diags.push(Diagnostic::error(
                DiagCode::TypeMismatch,
                format!(
                    "condition must be `bool`, found `{}`",
                    typed.ty.render(self.registry)
                ),
                typed.span,
            ));
        }
        typed
    }
}
