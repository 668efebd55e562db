//! Pretty printer.
//!
//! Emits source text that parses back to a structurally identical tree.
//! Parenthesized expressions survive as `Expr::Paren` nodes, so operator
//! grouping never has to be reconstructed here.

use super::*;
use std::fmt::Write;

/// Render a whole program as Zetan source.
pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    for decl in &program.decls {
        print_decl(&mut out, &decl.value);
        out.push('\n');
    }
    out
}

fn print_decl(out: &mut String, decl: &Decl) {
    match decl {
        Decl::Fn(func) => print_fn(out, func, 0),
        Decl::Struct(s) => {
            let _ = writeln!(out, "struct {} {{", s.name.value);
            for field in &s.fields {
                let _ = writeln!(out, "    {}: {},", field.name.value, field.ty.value);
            }
            out.push_str("}\n");
        }
        Decl::Class(c) => {
            let _ = write!(out, "class {}", c.name.value);
            if let Some(parent) = &c.extends {
                let _ = write!(out, " extends {}", parent.value);
            }
            if !c.implements.is_empty() {
                let names: Vec<&str> =
                    c.implements.iter().map(|i| i.value.name.as_str()).collect();
                let _ = write!(out, " implements {}", names.join(", "));
            }
            out.push_str(" {\n");
            for field in &c.fields {
                let _ = writeln!(out, "    {}: {};", field.name.value, field.ty.value);
            }
            for method in &c.methods {
                print_method(out, method);
            }
            out.push_str("}\n");
        }
        Decl::Interface(i) => {
            let _ = writeln!(out, "interface {} {{", i.name.value);
            for sig in &i.methods {
                let _ = writeln!(
                    out,
                    "    fn {}({}) -> {};",
                    sig.name.value,
                    params_to_string(&sig.params),
                    sig.return_type.value
                );
            }
            out.push_str("}\n");
        }
    }
}

fn print_fn(out: &mut String, func: &FnDecl, indent: usize) {
    let pad = "    ".repeat(indent);
    let _ = write!(
        out,
        "{}fn {}({}) -> {} ",
        pad,
        func.name.value,
        params_to_string(&func.params),
        func.return_type.value
    );
    print_block(out, &func.body.value, indent);
    out.push('\n');
}

fn print_method(out: &mut String, method: &MethodDecl) {
    let _ = write!(
        out,
        "    fn {}({}) -> {} ",
        method.name.value,
        params_to_string(&method.params),
        method.return_type.value
    );
    print_block(out, &method.body.value, 1);
    out.push('\n');
}

fn params_to_string(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", p.name.value, p.ty.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_block(out: &mut String, block: &Block, indent: usize) {
    let pad = "    ".repeat(indent);
    out.push_str("{\n");
    for stmt in &block.stmts {
        print_stmt(out, &stmt.value, indent + 1);
    }
    out.push_str(&pad);
    out.push('}');
}

fn print_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    let pad = "    ".repeat(indent);
    match stmt {
        Stmt::Let(let_stmt) => {
            out.push_str(&pad);
            out.push_str("let ");
            if let_stmt.mutable {
                out.push_str("mut ");
            }
            let _ = write!(out, "{}", let_stmt.name.value);
            if let Some(ty) = &let_stmt.ty {
                let _ = write!(out, ": {}", ty.value);
            }
            let _ = write!(out, " = ");
            print_expr(out, &let_stmt.init.value);
            out.push_str(";\n");
        }
        Stmt::Return(expr) => {
            out.push_str(&pad);
            out.push_str("return");
            if let Some(expr) = expr {
                out.push(' ');
                print_expr(out, &expr.value);
            }
            out.push_str(";\n");
        }
        Stmt::If {
            condition,
            then_block,
            else_block,
        } => {
            out.push_str(&pad);
            out.push_str("if ");
            print_expr(out, &condition.value);
            out.push(' ');
            print_block(out, &then_block.value, indent);
            if let Some(else_block) = else_block {
                out.push_str(" else ");
                print_block(out, &else_block.value, indent);
            }
            out.push('\n');
        }
        Stmt::While { condition, body } => {
            out.push_str(&pad);
            out.push_str("while ");
            print_expr(out, &condition.value);
            out.push(' ');
            print_block(out, &body.value, indent);
            out.push('\n');
        }
        Stmt::Expr(expr) => {
            out.push_str(&pad);
            print_expr(out, &expr.value);
            out.push_str(";\n");
        }
        Stmt::Block(block) => {
            out.push_str(&pad);
            print_block(out, &block.value, indent);
            out.push('\n');
        }
    }
}

fn print_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Literal(lit) => {
            let _ = write!(out, "{}", lit);
        }
        Expr::Ident(ident) => {
            let _ = write!(out, "{}", ident);
        }
        Expr::Binary { left, op, right } => {
            print_expr(out, &left.value);
            let _ = write!(out, " {} ", op);
            print_expr(out, &right.value);
        }
        Expr::Unary { op, expr } => {
            let _ = write!(out, "{}", op);
            print_expr(out, &expr.value);
        }
        Expr::Borrow { mutable, expr } => {
            out.push('&');
            if *mutable {
                out.push_str("mut ");
            }
            print_expr(out, &expr.value);
        }
        Expr::Assign { target, value } => {
            print_expr(out, &target.value);
            out.push_str(" = ");
            print_expr(out, &value.value);
        }
        Expr::Call { callee, args } => {
            let _ = write!(out, "{}(", callee.value);
            print_args(out, args);
            out.push(')');
        }
        Expr::Field { object, field } => {
            print_expr(out, &object.value);
            let _ = write!(out, ".{}", field.value);
        }
        Expr::MethodCall {
            object,
            method,
            args,
        } => {
            print_expr(out, &object.value);
            let _ = write!(out, ".{}(", method.value);
            print_args(out, args);
            out.push(')');
        }
        Expr::StructInit { name, fields } => {
            let _ = write!(out, "{} {{ ", name.value);
            for (i, (field, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}: ", field.value);
                print_expr(out, &value.value);
            }
            out.push_str(" }");
        }
        Expr::Paren(inner) => {
            out.push('(');
            print_expr(out, &inner.value);
            out.push(')');
        }
    }
}

fn print_args(out: &mut String, args: &[Node<Expr>]) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        print_expr(out, &arg.value);
    }
}
