//! End-to-end tests for the Zetan front-end pipeline.
//!
//! Each test pushes source text through the full pipeline (lexing,
//! parsing, registry construction, type checking, ownership checking)
//! via the driver library and inspects the resulting diagnostics.

use std::collections::HashMap;

use ztn_diag::DiagCode;
use ztn_driver::{check_units, compile_unit, UnitResult};

fn check(source: &str) -> UnitResult {
    compile_unit(source, 0, &HashMap::new())
}

#[test]
fn add_function_verifies_with_no_diagnostics() {
    let result = check("fn add(a: i32, b: i32) -> i32 { return a + b; }");
    assert!(result.is_verified());
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.typed.functions.len(), 1);
    assert_eq!(result.typed.functions[0].name, "add");
}

#[test]
fn string_returned_as_i32_is_one_type_mismatch() {
    let source = "fn bad() -> i32 { return \"x\"; }";
    let result = check(source);
    assert!(!result.is_verified());
    assert_eq!(result.diagnostics.error_count(), 1);
    let diag = result.diagnostics.iter().next().unwrap();
    assert_eq!(diag.code, DiagCode::TypeMismatch);
    assert_eq!(diag.span.start, source.find("return").unwrap());
}

#[test]
fn class_missing_interface_method_is_reported_once() {
    let source = "
        interface Shape {
            fn area() -> f64;
            fn perimeter() -> f64;
        }
        class Circle implements Shape {
            fn area() -> f64 { return 3.14; }
        }
    ";
    let result = check(source);
    assert_eq!(result.diagnostics.error_count(), 1);
    let diag = result.diagnostics.iter().next().unwrap();
    assert_eq!(diag.code, DiagCode::InterfaceNotSatisfied);
    assert!(diag.message.contains("perimeter"));
}

#[test]
fn moved_binding_reported_at_second_use() {
    let source = "
        struct Token { id: i32 }
        fn f() -> unit {
            let t = Token { id: 1 };
            let moved = t;
            let again = t;
            return;
        }
    ";
    let result = check(source);
    let moves: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == DiagCode::UseAfterMove)
        .collect();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].span.start, source.rfind("t;").unwrap());
}

#[test]
fn mutually_recursive_structs_verify() {
    let result = check(
        "
        struct A { next: B }
        struct B { prev: A }
        ",
    );
    assert!(result.is_verified());
}

#[test]
fn syntax_errors_do_not_hide_later_type_errors() {
    let source = "
        fn broken() -> i32 {
            let = 5;
            return 0;
        }
        fn bad() -> i32 { return \"x\"; }
    ";
    let result = check(source);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagCode::SyntaxError));
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagCode::TypeMismatch));
}

#[test]
fn lex_errors_flow_into_unit_diagnostics() {
    let source = "fn f() -> i32 { let x = 1$; return x; }";
    let result = check(source);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagCode::InvalidCharacter));
}

#[test]
fn units_share_function_signatures() {
    let sources = vec![
        (
            0,
            "fn scale(v: i32, by: i32) -> i32 { return v * by; }".to_string(),
        ),
        (
            1,
            "fn double(v: i32) -> i32 { return scale(v, 2); }".to_string(),
        ),
    ];
    let results = check_units(&sources).unwrap();
    assert!(results.iter().all(|r| r.is_verified()));
}

#[test]
fn cross_unit_type_errors_are_caught() {
    let sources = vec![
        (
            0,
            "fn scale(v: i32, by: i32) -> i32 { return v * by; }".to_string(),
        ),
        (
            1,
            "fn double(v: f64) -> i32 { return scale(v, 2); }".to_string(),
        ),
    ];
    let results = check_units(&sources).unwrap();
    assert!(results[0].is_verified());
    assert!(results[1]
        .diagnostics
        .iter()
        .any(|d| d.code == DiagCode::TypeMismatch));
}

#[test]
fn many_units_check_in_parallel() {
    let sources: Vec<(usize, String)> = (0..16)
        .map(|i| {
            (
                i,
                format!("fn f{}(x: i32) -> i32 {{ return x + {}; }}", i, i),
            )
        })
        .collect();
    let results = check_units(&sources).unwrap();
    assert_eq!(results.len(), 16);
    assert!(results.iter().all(|r| r.is_verified()));
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.file_id, i);
    }
}

#[test]
fn warnings_do_not_block_verification() {
    let result = check("fn f() -> i32 { let unused = 1; return 2; }");
    assert!(result.is_verified());
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == DiagCode::UnusedBinding));
}

#[test]
fn ownership_pipeline_end_to_end() {
    let source = "
        struct Buffer { size: i32 }
        fn consume(b: Buffer) -> i32 { return b.size; }
        fn inspect(b: &Buffer) -> i32 { return b.size; }
        fn f() -> i32 {
            let b = Buffer { size: 8 };
            let n = inspect(&b);
            let m = consume(b);
            return n + m;
        }
    ";
    let result = check(source);
    assert!(result.is_verified(), "{:?}", result.diagnostics.iter().collect::<Vec<_>>());
}
