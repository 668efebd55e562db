//! Expression checking (bottom-up type inference)

use ztn_ast::{BinaryOp, Expr, Literal, Node, Span, UnaryOp};
use ztn_diag::{DiagCode, Diagnostic};

use crate::checker::TypeChecker;
use crate::registry::SymbolKind;
use crate::typed_ast::{TypedExpr, TypedExprKind};
use crate::types::Type;

impl<'a> TypeChecker<'a> {
    pub(crate) fn check_expr(&mut self, expr: &Node<Expr>) -> TypedExpr {
        match &expr.value {
            Expr::Literal(lit) => {
                let ty = match lit {
                    Literal::Int(_) => Type::I32,
                    Literal::Float(_) => Type::F64,
                    Literal::Str(_) => Type::Str,
                    Literal::Bool(_) => Type::Bool,
                };
                TypedExpr {
                    kind: TypedExprKind::Literal(lit.clone()),
                    ty,
                    span: expr.span,
                }
            }

            Expr::Ident(ident) => self.check_ident(&ident.name, expr.span),

            Expr::Binary { left, op, right } => self.check_binary(left, *op, right, expr.span),

            Expr::Unary { op, expr: operand } => {
                let operand = self.check_expr(operand);
                let ty = match op {
                    UnaryOp::Neg if operand.ty.is_numeric() => operand.ty.clone(),
                    UnaryOp::Not if operand.ty.matches(&Type::Bool) => Type::Bool,
                    _ if operand.ty == Type::Unknown => Type::Unknown,
                    UnaryOp::Neg => {
                        self.diags.push(Diagnostic::error(
                            DiagCode::TypeMismatch,
                            format!(
                                "cannot negate `{}`",
                                operand.ty.render(self.registry)
                            ),
                            operand.span,
                        ));
                        Type::Unknown
                    }
                    UnaryOp::Not => {
                        self.diags.push(Diagnostic::error(
                            DiagCode::TypeMismatch,
                            format!(
                                "`!` requires `bool`, found `{}`",
                                operand.ty.render(self.registry)
                            ),
                            operand.span,
                        ));
                        Type::Unknown
                    }
                };
                TypedExpr {
                    kind: TypedExprKind::Unary {
                        op: *op,
                        expr: Box::new(operand),
                    },
                    ty,
                    span: expr.span,
                }
            }

            Expr::Borrow {
                mutable,
                expr: place,
            } => {
                if !is_place(&place.value) {
                    self.diags.push(Diagnostic::error(
                        DiagCode::TypeMismatch,
                        "only variables and fields can be borrowed",
                        place.span,
                    ));
                }
                let place = self.check_expr(place);
                let ty = Type::Ref {
                    mutable: *mutable,
                    inner: Box::new(place.ty.clone()),
                };
                TypedExpr {
                    kind: TypedExprKind::Borrow {
                        mutable: *mutable,
                        expr: Box::new(place),
                    },
                    ty,
                    span: expr.span,
                }
            }

            Expr::Assign { target, value } => self.check_assign(target, value, expr.span),

            Expr::Call { callee, args } => self.check_call(callee, args, expr.span),

            Expr::Field { object, field } => {
                let object = self.check_expr(object);
                let ty = self.member_field_type(&object.ty, &field.value.name, field.span);
                TypedExpr {
                    kind: TypedExprKind::Field {
                        object: Box::new(object),
                        field: field.value.name.clone(),
                    },
                    ty,
                    span: expr.span,
                }
            }

            Expr::MethodCall {
                object,
                method,
                args,
            } => self.check_method_call(object, method, args, expr.span),

            Expr::StructInit { name, fields } => self.check_struct_init(name, fields, expr.span),

            // Grouping carries no semantics past parsing.
            Expr::Paren(inner) => {
                let mut typed = self.check_expr(inner);
                typed.span = expr.span;
                typed
            }
        }
    }

    fn check_ident(&mut self, name: &str, span: Span) -> TypedExpr {
        if let Some(info) = self.env.lookup(name) {
            let ty = info.ty.clone();
            self.env.mark_used(name);
            return TypedExpr {
                kind: TypedExprKind::Ident(name.to_string()),
                ty,
                span,
            };
        }

        if let Some(id) = self.registry.lookup(name) {
            if matches!(self.registry.symbol(id).kind, SymbolKind::Function { .. }) {
                self.diags.push(Diagnostic::error(
                    DiagCode::TypeMismatch,
                    format!("`{}` is a function and cannot be used as a value", name),
                    span,
                ));
                return TypedExpr::poisoned(span);
            }
        }

        self.diags.push(Diagnostic::error(
            DiagCode::UndefinedVariable,
            format!("undefined variable `{}`", name),
            span,
        ));
        TypedExpr::poisoned(span)
    }

    fn check_binary(
        &mut self,
        left: &Node<Expr>,
        op: BinaryOp,
        right: &Node<Expr>,
        span: Span,
    ) -> TypedExpr {
        let left = self.check_expr(left);
        let right = self.check_expr(right);

        let ty = match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                if left.ty.is_numeric() && left.ty.matches(&right.ty) {
                    left.ty.clone()
                } else if left.ty == Type::Unknown || right.ty == Type::Unknown {
                    Type::Unknown
                } else {
                    self.diags.push(Diagnostic::error(
                        DiagCode::TypeMismatch,
                        format!(
                            "`{}` requires two operands of the same numeric type, found `{}` and `{}`",
                            op,
                            left.ty.render(self.registry),
                            right.ty.render(self.registry)
                        ),
                        span,
                    ));
                    Type::Unknown
                }
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                if left.ty.is_numeric() && left.ty.matches(&right.ty) {
                    Type::Bool
                } else if left.ty == Type::Unknown || right.ty == Type::Unknown {
                    Type::Unknown
                } else {
                    self.diags.push(Diagnostic::error(
                        DiagCode::TypeMismatch,
                        format!(
                            "`{}` requires two operands of the same numeric type, found `{}` and `{}`",
                            op,
                            left.ty.render(self.registry),
                            right.ty.render(self.registry)
                        ),
                        span,
                    ));
                    Type::Unknown
                }
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                if left.ty.matches(&right.ty) {
                    Type::Bool
                } else {
                    self.diags.push(Diagnostic::error(
                        DiagCode::TypeMismatch,
                        format!(
                            "cannot compare `{}` with `{}`",
                            left.ty.render(self.registry),
                            right.ty.render(self.registry)
                        ),
                        span,
                    ));
                    Type::Unknown
                }
            }
            BinaryOp::And | BinaryOp::Or => {
                if left.ty.matches(&Type::Bool) && right.ty.matches(&Type::Bool) {
                    Type::Bool
                } else {
                    self.diags.push(Diagnostic::error(
                        DiagCode::TypeMismatch,
                        format!(
                            "`{}` requires `bool` operands, found `{}` and `{}`",
                            op,
                            left.ty.render(self.registry),
                            right.ty.render(self.registry)
                        ),
                        span,
                    ));
                    Type::Unknown
                }
            }
        };

        TypedExpr {
            kind: TypedExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            ty,
            span,
        }
    }

    fn check_assign(
        &mut self,
        target: &Node<Expr>,
        value: &Node<Expr>,
        span: Span,
    ) -> TypedExpr {
        let value = self.check_expr(value);
        let target = self.check_expr(target);

        self.check_assign_target_mutable(&target);

        if !value.ty.matches(&target.ty) {
            self.diags.push(Diagnostic::error(
                DiagCode::TypeMismatch,
                format!(
                    "cannot assign `{}` to a place of type `{}`",
                    value.ty.render(self.registry),
                    target.ty.render(self.registry)
                ),
                value.span,
            ));
        }

        TypedExpr {
            kind: TypedExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            ty: Type::Unit,
            span,
        }
    }

    /// Walks `a.b.c` down to its base binding: assignment requires a `mut`
    /// binding at the root and no shared reference along the path.
    fn check_assign_target_mutable(&mut self, target: &TypedExpr) {
        let mut cursor = target;
        loop {
            match &cursor.kind {
                TypedExprKind::Field { object, .. } => {
                    if matches!(object.ty, Type::Ref { mutable: false, .. }) {
                        self.diags.push(Diagnostic::error(
                            DiagCode::AssignToImmutable,
                            "cannot assign through a shared reference",
                            cursor.span,
                        ));
                        return;
                    }
                    cursor = object;
                }
                TypedExprKind::Ident(name) => {
                    if let Some(info) = self.env.lookup(name) {
                        if !info.mutable && !matches!(info.ty, Type::Ref { mutable: true, .. }) {
                            let decl_span = info.decl_span;
                            self.diags.push(
                                Diagnostic::error(
                                    DiagCode::AssignToImmutable,
                                    format!("cannot assign to immutable binding `{}`", name),
                                    cursor.span,
                                )
                                .with_note(decl_span, "declared without `mut` here"),
                            );
                        }
                    }
                    return;
                }
                _ => return,
            }
        }
    }

    fn check_call(
        &mut self,
        callee: &Node<ztn_ast::Ident>,
        args: &[Node<Expr>],
        span: Span,
    ) -> TypedExpr {
        let typed_args: Vec<TypedExpr> = args.iter().map(|a| self.check_expr(a)).collect();
        let name = &callee.value.name;

        if self.env.lookup(name).is_some() {
            self.diags.push(Diagnostic::error(
                DiagCode::NotCallable,
                format!("`{}` is not callable", name),
                callee.span,
            ));
            return TypedExpr::poisoned(span);
        }

        let Some(id) = self.registry.lookup(name) else {
            self.diags.push(Diagnostic::error(
                DiagCode::UndefinedVariable,
                format!("undefined function `{}`", name),
                callee.span,
            ));
            return TypedExpr::poisoned(span);
        };

        let SymbolKind::Function { params, ret } = &self.registry.symbol(id).kind else {
            self.diags.push(Diagnostic::error(
                DiagCode::NotCallable,
                format!("`{}` is not a function", name),
                callee.span,
            ));
            return TypedExpr::poisoned(span);
        };
        let params = params.clone();
        let ret = ret.clone();

        self.check_args(&params, &typed_args, span, name);

        TypedExpr {
            kind: TypedExprKind::Call {
                callee: name.clone(),
                param_types: params,
                args: typed_args,
            },
            ty: ret,
            span,
        }
    }

    fn check_method_call(
        &mut self,
        object: &Node<Expr>,
        method: &Node<ztn_ast::Ident>,
        args: &[Node<Expr>],
        span: Span,
    ) -> TypedExpr {
        let object = self.check_expr(object);
        let typed_args: Vec<TypedExpr> = args.iter().map(|a| self.check_expr(a)).collect();

        if object.ty == Type::Unknown {
            return TypedExpr::poisoned(span);
        }

        let Type::Named(id) = object.ty.deref() else {
            self.diags.push(Diagnostic::error(
                DiagCode::UnknownMember,
                format!(
                    "type `{}` has no methods",
                    object.ty.render(self.registry)
                ),
                method.span,
            ));
            return TypedExpr::poisoned(span);
        };

        let Some(info) = self.registry.find_method(*id, &method.value.name) else {
            self.diags.push(Diagnostic::error(
                DiagCode::UnknownMember,
                format!(
                    "`{}` has no method `{}`",
                    self.registry.name_of(*id),
                    method.value.name
                ),
                method.span,
            ));
            return TypedExpr::poisoned(span);
        };

        self.check_args(&info.params, &typed_args, span, &method.value.name);

        TypedExpr {
            kind: TypedExprKind::MethodCall {
                object: Box::new(object),
                method: method.value.name.clone(),
                param_types: info.params,
                args: typed_args,
            },
            ty: info.ret,
            span,
        }
    }

    fn check_args(&mut self, params: &[Type], args: &[TypedExpr], span: Span, name: &str) {
        if params.len() != args.len() {
            self.diags.push(Diagnostic::error(
                DiagCode::ArityMismatch,
                format!(
                    "`{}` expects {} argument(s), found {}",
                    name,
                    params.len(),
                    args.len()
                ),
                span,
            ));
            return;
        }
        for (param, arg) in params.iter().zip(args) {
            if !arg.ty.matches(param) {
                self.diags.push(Diagnostic::error(
                    DiagCode::TypeMismatch,
                    format!(
                        "expected `{}`, found `{}`",
                        param.render(self.registry),
                        arg.ty.render(self.registry)
                    ),
                    arg.span,
                ));
            }
        }
    }

    fn check_struct_init(
        &mut self,
        name: &Node<ztn_ast::Ident>,
        fields: &[(Node<ztn_ast::Ident>, Node<Expr>)],
        span: Span,
    ) -> TypedExpr {
        let typed_fields: Vec<(String, TypedExpr)> = fields
            .iter()
            .map(|(field, value)| (field.value.name.clone(), self.check_expr(value)))
            .collect();

        let Some(id) = self.registry.lookup(&name.value.name) else {
            self.diags.push(Diagnostic::error(
                DiagCode::UnknownType,
                format!("unknown type `{}`", name.value.name),
                name.span,
            ));
            return TypedExpr::poisoned(span);
        };

        if !matches!(
            self.registry.symbol(id).kind,
            SymbolKind::Struct { .. } | SymbolKind::Class { .. }
        ) {
            self.diags.push(Diagnostic::error(
                DiagCode::TypeMismatch,
                format!("`{}` cannot be constructed with a literal", name.value.name),
                name.span,
            ));
            return TypedExpr::poisoned(span);
        }

        let declared = self.registry.all_fields(id);

        for (field_name, value) in &typed_fields {
            match declared.iter().find(|(name, _)| name == field_name) {
                Some((_, field_ty)) => {
                    if !value.ty.matches(field_ty) {
                        self.diags.push(Diagnostic::error(
                            DiagCode::TypeMismatch,
                            format!(
                                "field `{}` expects `{}`, found `{}`",
                                field_name,
                                field_ty.render(self.registry),
                                value.ty.render(self.registry)
                            ),
                            value.span,
                        ));
                    }
                }
                None => {
                    self.diags.push(Diagnostic::error(
                        DiagCode::UnknownMember,
                        format!(
                            "`{}` has no field `{}`",
                            name.value.name, field_name
                        ),
                        value.span,
                    ));
                }
            }
        }

        for (declared_name, _) in &declared {
            let count = typed_fields
                .iter()
                .filter(|(name, _)| name == declared_name)
                .count();
            if count == 0 {
                self.diags.push(Diagnostic::error(
                    DiagCode::TypeMismatch,
                    format!(
                        "missing field `{}` in initializer of `{}`",
                        declared_name, name.value.name
                    ),
                    span,
                ));
            } else if count > 1 {
                self.diags.push(Diagnostic::error(
                    DiagCode::TypeMismatch,
                    format!("field `{}` specified more than once", declared_name),
                    span,
                ));
            }
        }

        TypedExpr {
            kind: TypedExprKind::StructInit {
                symbol: id,
                fields: typed_fields,
            },
            ty: Type::Named(id),
            span,
        }
    }

    fn member_field_type(&mut self, object_ty: &Type, field: &str, span: Span) -> Type {
        if *object_ty == Type::Unknown {
            return Type::Unknown;
        }
        match object_ty.deref() {
            Type::Named(id) => match self.registry.field_type(*id, field) {
                Some(ty) => ty,
                None => {
                    self.diags.push(Diagnostic::error(
                        DiagCode::UnknownMember,
                        format!("`{}` has no field `{}`", self.registry.name_of(*id), field),
                        span,
                    ));
                    Type::Unknown
                }
            },
            other => {
                self.diags.push(Diagnostic::error(
                    DiagCode::UnknownMember,
                    format!("type `{}` has no fields", other.render(self.registry)),
                    span,
                ));
                Type::Unknown
            }
        }
    }
}

fn is_place(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) | Expr::Field { .. } => true,
        Expr::Paren(inner) => is_place(&inner.value),
        _ => false,
    }
}
