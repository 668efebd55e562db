//! Ownership and borrow checking.
//!
//! A per-binding state machine walked over each function body in
//! control-flow order. `if` arms are checked independently and merged by
//! keeping the more restrictive state per binding; `while` bodies run
//! twice (entry state, then the post-iteration merge) to catch
//! invalidation across iterations. Borrows retire on scope exit, stack
//! discipline, never counted across scopes.

use std::collections::HashMap;

use ztn_ast::Span;
use ztn_diag::{DiagCode, Diagnostic, Diagnostics};

use crate::typed_ast::{TypedBlock, TypedExpr, TypedExprKind, TypedFn, TypedProgram, TypedStmt};
use crate::types::Type;

/// Lifecycle of one binding's value.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingState {
    Uninitialized,
    Owned,
    /// Terminal until reassignment; carries the move site for the note.
    MovedOut(Span),
    BorrowedShared(u32),
    BorrowedMut,
}

impl BindingState {
    /// Higher rank wins when two control-flow arms disagree.
    fn rank(&self) -> u8 {
        match self {
            BindingState::Owned => 0,
            BindingState::Uninitialized => 1,
            BindingState::BorrowedShared(_) => 2,
            BindingState::BorrowedMut => 3,
            BindingState::MovedOut(_) => 4,
        }
    }

    fn merge(&self, other: &BindingState) -> BindingState {
        match (self, other) {
            (BindingState::BorrowedShared(a), BindingState::BorrowedShared(b)) => {
                BindingState::BorrowedShared(*a.max(b))
            }
            (a, b) if a.rank() >= b.rank() => a.clone(),
            (_, b) => b.clone(),
        }
    }

    pub fn borrow_shared(&mut self) -> Result<(), BorrowError> {
        match self {
            BindingState::Owned => {
                *self = BindingState::BorrowedShared(1);
                Ok(())
            }
            BindingState::BorrowedShared(n) => {
                *n += 1;
                Ok(())
            }
            BindingState::BorrowedMut => Err(BorrowError::MutOutstanding),
            BindingState::MovedOut(span) => Err(BorrowError::Moved(*span)),
            BindingState::Uninitialized => Err(BorrowError::Uninitialized),
        }
    }

    pub fn borrow_mut(&mut self) -> Result<(), BorrowError> {
        match self {
            BindingState::Owned => {
                *self = BindingState::BorrowedMut;
                Ok(())
            }
            BindingState::BorrowedShared(_) => Err(BorrowError::SharedOutstanding),
            BindingState::BorrowedMut => Err(BorrowError::MutOutstanding),
            BindingState::MovedOut(span) => Err(BorrowError::Moved(*span)),
            BindingState::Uninitialized => Err(BorrowError::Uninitialized),
        }
    }

    pub fn release(&mut self, mutable: bool) {
        match (mutable, &mut *self) {
            (true, BindingState::BorrowedMut) => *self = BindingState::Owned,
            (false, BindingState::BorrowedShared(1)) => *self = BindingState::Owned,
            (false, BindingState::BorrowedShared(n)) => *n -= 1,
            _ => {}
        }
    }

    pub fn shared_count(&self) -> u32 {
        match self {
            BindingState::BorrowedShared(n) => *n,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BorrowError {
    SharedOutstanding,
    MutOutstanding,
    Moved(Span),
    Uninitialized,
}

/// Where a reference value ultimately points.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RefRoot {
    /// Caller-owned data reached through a parameter; safe to return.
    Param,
    /// Data owned by this function's frame; returning it dangles.
    Local,
}

#[derive(Debug, Clone)]
struct Binding {
    state: BindingState,
    ty: Type,
    is_param: bool,
    ref_root: Option<RefRoot>,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    bindings: HashMap<String, Binding>,
    /// Borrows taken for bindings that outlive this scope; released in
    /// reverse order on exit.
    borrows: Vec<(String, bool)>,
}

pub struct OwnershipChecker {
    diags: Diagnostics,
    scopes: Vec<Scope>,
    /// Second pass over a loop body: suppress reports already made.
    dedup: bool,
}

pub fn check(program: &TypedProgram) -> Diagnostics {
    let mut checker = OwnershipChecker {
        diags: Diagnostics::new(),
        scopes: Vec::new(),
        dedup: false,
    };
    for function in &program.functions {
        checker.check_fn(function);
    }
    checker.diags
}

impl OwnershipChecker {
    fn check_fn(&mut self, function: &TypedFn) {
        self.scopes = vec![Scope::default()];
        self.dedup = false;
        for param in &function.params {
            let ref_root = match &param.ty {
                Type::Ref { .. } => Some(RefRoot::Param),
                _ => None,
            };
            self.declare(
                param.name.clone(),
                Binding {
                    state: BindingState::Owned,
                    ty: param.ty.clone(),
                    is_param: true,
                    ref_root,
                },
            );
        }
        self.walk_block(&function.body);
    }

    fn declare(&mut self, name: String, binding: Binding) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name, binding);
        }
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Binding> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(binding) = scope.bindings.get_mut(name) {
                return Some(binding);
            }
        }
        None
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }

    fn push_diag(&mut self, diag: Diagnostic) {
        if self.dedup && self.diags.contains(diag.code, diag.span) {
            return;
        }
        self.diags.push(diag);
    }

    fn walk_block(&mut self, block: &TypedBlock) {
        self.scopes.push(Scope::default());
        for stmt in &block.stmts {
            self.walk_stmt(stmt);
        }
        self.exit_scope();
    }

    fn exit_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else { return };
        for (name, mutable) in scope.borrows.into_iter().rev() {
            if let Some(binding) = self.lookup_mut(&name) {
                binding.state.release(mutable);
            }
        }
    }

    fn walk_stmt(&mut self, stmt: &TypedStmt) {
        match stmt {
            TypedStmt::Let {
                name, init, ty, ..
            } => {
                let mut taken = Vec::new();
                self.walk_expr(init, &mut taken);
                // Borrows feeding a ref binding live as long as the
                // binding's scope; everything else retires with the
                // statement.
                if matches!(ty, Type::Ref { .. }) {
                    if let Some(scope) = self.scopes.last_mut() {
                        scope.borrows.extend(taken);
                    }
                } else {
                    self.release_temps(taken);
                }
                let ref_root = self.ref_root_of(init);
                self.declare(
                    name.clone(),
                    Binding {
                        state: BindingState::Owned,
                        ty: ty.clone(),
                        is_param: false,
                        ref_root,
                    },
                );
            }

            TypedStmt::Return { value, span } => {
                if let Some(value) = value {
                    let mut taken = Vec::new();
                    self.walk_expr(value, &mut taken);
                    self.check_returned_reference(value, *span);
                    self.release_temps(taken);
                }
            }

            TypedStmt::If {
                condition,
                then_block,
                else_block,
                ..
            } => {
                let mut taken = Vec::new();
                self.walk_expr(condition, &mut taken);
                self.release_temps(taken);

                let entry = self.scopes.clone();
                self.walk_block(then_block);
                let after_then = std::mem::replace(&mut self.scopes, entry.clone());
                let after_else = match else_block {
                    Some(else_block) => {
                        self.walk_block(else_block);
                        std::mem::replace(&mut self.scopes, entry)
                    }
                    None => entry,
                };
                self.scopes = merge_scopes(after_then, after_else);
            }

            TypedStmt::While {
                condition, body, ..
            } => {
                let entry = self.scopes.clone();

                let mut taken = Vec::new();
                self.walk_expr(condition, &mut taken);
                self.release_temps(taken);
                self.walk_block(body);

                // Second pass from the merged state catches moves and
                // borrows that only conflict across iterations.
                let after_once = std::mem::replace(&mut self.scopes, Vec::new());
                self.scopes = merge_scopes(entry, after_once);
                let was_dedup = std::mem::replace(&mut self.dedup, true);
                let mut taken = Vec::new();
                self.walk_expr(condition, &mut taken);
                self.release_temps(taken);
                self.walk_block(body);
                self.dedup = was_dedup;
            }

            TypedStmt::Expr(expr) => {
                let mut taken = Vec::new();
                self.walk_expr(expr, &mut taken);
                self.release_temps(taken);
            }

            TypedStmt::Block(block) => self.walk_block(block),
        }
    }

    fn release_temps(&mut self, taken: Vec<(String, bool)>) {
        for (name, mutable) in taken.into_iter().rev() {
            if let Some(binding) = self.lookup_mut(&name) {
                binding.state.release(mutable);
            }
        }
    }

    fn walk_expr(&mut self, expr: &TypedExpr, taken: &mut Vec<(String, bool)>) {
        match &expr.kind {
            TypedExprKind::Literal(_) | TypedExprKind::Poisoned => {}

            TypedExprKind::Ident(name) => {
                self.use_value(name, expr.span);
            }

            TypedExprKind::Binary { left, right, .. } => {
                self.walk_expr(left, taken);
                self.walk_expr(right, taken);
            }

            TypedExprKind::Unary { expr: operand, .. } => {
                self.walk_expr(operand, taken);
            }

            TypedExprKind::Borrow {
                mutable,
                expr: place,
            } => {
                if let Some(root) = root_ident(place) {
                    self.do_borrow(&root, *mutable, expr.span, taken);
                } else {
                    self.walk_expr(place, taken);
                }
            }

            TypedExprKind::Assign { target, value } => {
                self.walk_expr(value, taken);
                self.walk_assign_target(target, value);
            }

            TypedExprKind::Call { args, .. } | TypedExprKind::MethodCall { args, .. } => {
                if let TypedExprKind::MethodCall { object, .. } = &expr.kind {
                    // The receiver is read, not consumed.
                    if let Some(root) = root_ident(object) {
                        self.do_borrow(&root, false, object.span, taken);
                    } else {
                        self.walk_expr(object, taken);
                    }
                }
                // By-value arguments move through `use_value`; by-reference
                // arguments carry a Borrow expression whose borrow lands in
                // `taken` and covers the call's duration.
                for arg in args {
                    self.walk_expr(arg, taken);
                }
            }

            TypedExprKind::Field { object, .. } => {
                // Reading a copy field still requires a live root; a
                // non-copy field moves the whole root out.
                if let Some(root) = root_ident(object) {
                    if expr.ty.is_copy() {
                        self.check_live(&root, expr.span);
                    } else {
                        self.use_value(&root, expr.span);
                    }
                } else {
                    self.walk_expr(object, taken);
                }
            }

            TypedExprKind::StructInit { fields, .. } => {
                for (_, value) in fields {
                    self.walk_expr(value, taken);
                }
            }
        }
    }

    fn walk_assign_target(&mut self, target: &TypedExpr, value: &TypedExpr) {
        let Some(root) = root_ident(target) else { return };
        let Some(binding) = self.lookup(&root) else { return };

        match binding.state.clone() {
            BindingState::BorrowedShared(_) | BindingState::BorrowedMut => {
                self.push_diag(Diagnostic::error(
                    DiagCode::BorrowConflict,
                    format!("cannot assign to `{}` while it is borrowed", root),
                    target.span,
                ));
            }
            BindingState::MovedOut(moved_at) => {
                if matches!(target.kind, TypedExprKind::Ident(_)) {
                    // Reassignment of the whole binding revives it.
                    let new_root = self.ref_root_of(value);
                    if let Some(binding) = self.lookup_mut(&root) {
                        binding.state = BindingState::Owned;
                        binding.ref_root = new_root;
                    }
                } else {
                    self.push_diag(
                        Diagnostic::error(
                            DiagCode::UseAfterMove,
                            format!("use of moved value `{}`", root),
                            target.span,
                        )
                        .with_note(moved_at, "value moved here"),
                    );
                }
            }
            _ => {
                if matches!(target.kind, TypedExprKind::Ident(_)) {
                    let new_root = self.ref_root_of(value);
                    if let Some(binding) = self.lookup_mut(&root) {
                        binding.state = BindingState::Owned;
                        binding.ref_root = new_root;
                    }
                }
            }
        }
    }

    fn use_value(&mut self, name: &str, span: Span) {
        let Some(binding) = self.lookup(name) else { return };
        let is_copy = binding.ty.is_copy();

        match binding.state.clone() {
            BindingState::MovedOut(moved_at) => {
                self.push_diag(
                    Diagnostic::error(
                        DiagCode::UseAfterMove,
                        format!("use of moved value `{}`", name),
                        span,
                    )
                    .with_note(moved_at, "value moved here"),
                );
            }
            BindingState::BorrowedShared(_) | BindingState::BorrowedMut if !is_copy => {
                self.push_diag(Diagnostic::error(
                    DiagCode::BorrowConflict,
                    format!("cannot move `{}` out while it is borrowed", name),
                    span,
                ));
            }
            BindingState::Owned if !is_copy => {
                if let Some(binding) = self.lookup_mut(name) {
                    binding.state = BindingState::MovedOut(span);
                }
            }
            _ => {}
        }
    }

    /// A read that must not see a moved-out binding but moves nothing.
    fn check_live(&mut self, name: &str, span: Span) {
        if let Some(binding) = self.lookup(name) {
            if let BindingState::MovedOut(moved_at) = binding.state {
                self.push_diag(
                    Diagnostic::error(
                        DiagCode::UseAfterMove,
                        format!("use of moved value `{}`", name),
                        span,
                    )
                    .with_note(moved_at, "value moved here"),
                );
            }
        }
    }

    fn do_borrow(
        &mut self,
        name: &str,
        mutable: bool,
        span: Span,
        taken: &mut Vec<(String, bool)>,
    ) {
        let Some(binding) = self.lookup_mut(name) else { return };
        let result = if mutable {
            binding.state.borrow_mut()
        } else {
            binding.state.borrow_shared()
        };
        match result {
            Ok(()) => taken.push((name.to_string(), mutable)),
            Err(BorrowError::Moved(moved_at)) => {
                self.push_diag(
                    Diagnostic::error(
                        DiagCode::UseAfterMove,
                        format!("use of moved value `{}`", name),
                        span,
                    )
                    .with_note(moved_at, "value moved here"),
                );
            }
            Err(BorrowError::SharedOutstanding) => {
                self.push_diag(Diagnostic::error(
                    DiagCode::BorrowConflict,
                    format!(
                        "cannot mutably borrow `{}` while shared borrows are outstanding",
                        name
                    ),
                    span,
                ));
            }
            Err(BorrowError::MutOutstanding) => {
                self.push_diag(Diagnostic::error(
                    DiagCode::BorrowConflict,
                    format!("cannot borrow `{}` while it is mutably borrowed", name),
                    span,
                ));
            }
            Err(BorrowError::Uninitialized) => {
                self.push_diag(Diagnostic::error(
                    DiagCode::BorrowConflict,
                    format!("cannot borrow uninitialized binding `{}`", name),
                    span,
                ));
            }
        }
    }

    /// Where would the value of this expression point, were it a reference?
    fn ref_root_of(&self, expr: &TypedExpr) -> Option<RefRoot> {
        match &expr.kind {
            TypedExprKind::Borrow { expr: place, .. } => {
                let root = root_ident(place)?;
                let binding = self.lookup(&root)?;
                match (&binding.ty, binding.is_param) {
                    (Type::Ref { .. }, _) => binding.ref_root,
                    (_, true) => Some(RefRoot::Param),
                    (_, false) => Some(RefRoot::Local),
                }
            }
            TypedExprKind::Ident(name) => {
                let binding = self.lookup(name)?;
                binding.ref_root
            }
            // A callee may only return references rooted in its own
            // parameters, so results are caller-reachable.
            TypedExprKind::Call { .. } | TypedExprKind::MethodCall { .. } => Some(RefRoot::Param),
            _ => None,
        }
    }

    fn check_returned_reference(&mut self, value: &TypedExpr, span: Span) {
        if !matches!(value.ty, Type::Ref { .. }) {
            return;
        }
        if self.ref_root_of(value) == Some(RefRoot::Local) {
            self.push_diag(Diagnostic::error(
                DiagCode::DanglingReference,
                "returned reference points at a binding local to this function",
                span,
            ));
        }
    }
}

/// Base binding of a place chain: `a` for `a.b.c`.
fn root_ident(expr: &TypedExpr) -> Option<String> {
    match &expr.kind {
        TypedExprKind::Ident(name) => Some(name.clone()),
        TypedExprKind::Field { object, .. } => root_ident(object),
        TypedExprKind::Borrow { expr, .. } => root_ident(expr),
        _ => None,
    }
}

/// Per-binding merge of two control-flow arms: same shape is guaranteed
/// because each arm pushed and popped its own scopes.
fn merge_scopes(a: Vec<Scope>, b: Vec<Scope>) -> Vec<Scope> {
    a.into_iter()
        .zip(b)
        .map(|(left, right)| {
            let mut bindings = HashMap::new();
            for (name, binding) in left.bindings {
                let state = match right.bindings.get(&name) {
                    Some(other) => binding.state.merge(&other.state),
                    None => binding.state.clone(),
                };
                bindings.insert(
                    name,
                    Binding {
                        state,
                        ..binding
                    },
                );
            }
            Scope {
                bindings,
                borrows: left.borrows,
            }
        })
        .collect()
}
