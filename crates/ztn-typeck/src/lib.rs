//! # Zetan Type Checker
//!
//! Symbol/type registry, ownership-aware type checker, and the typed
//! program representation. `check_unit` runs the whole middle of the
//! pipeline for one compilation unit: registry collection (two passes),
//! body checking, then ownership/borrow analysis.

mod checker;
mod decl_checker;
mod env;
mod expr_checker;
pub mod ownership;
mod registry;
mod stmt_checker;
mod typed_ast;
mod types;

pub use checker::TypeChecker;
pub use ownership::BindingState;
pub use registry::{ExternSig, MethodInfo, Registry, Symbol, SymbolId, SymbolKind};
pub use typed_ast::{
    TypedBlock, TypedExpr, TypedExprKind, TypedFn, TypedParam, TypedProgram, TypedStmt,
};
pub use types::Type;

use std::collections::HashMap;

use ztn_ast::Program;
use ztn_diag::Diagnostics;

/// Checks one parsed unit against its extern symbol set. The typed program
/// is only usable by a backend when the returned diagnostics carry no
/// errors; ownership analysis still runs after type errors so one pass
/// surfaces as many independent problems as possible.
pub fn check_unit(
    program: &Program,
    externs: &HashMap<String, ExternSig>,
) -> (TypedProgram, Diagnostics) {
    let mut diags = Diagnostics::new();
    let registry = Registry::build(program, externs, &mut diags);
    let (typed, check_diags) = TypeChecker::new(&registry).check_program(program);
    diags.extend(check_diags);
    diags.extend(ownership::check(&typed));
    (typed, diags)
}
