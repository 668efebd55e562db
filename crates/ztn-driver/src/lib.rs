//! # Zetan Driver
//!
//! Runs the front-end pipeline for one or more compilation units. Units
//! are independent except for a read-only extern symbol index that must be
//! fully built before any unit's checking begins; once it exists, units
//! check in parallel on scoped worker threads with per-unit diagnostic
//! sinks.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use ztn_ast::{Decl, Program};
use ztn_diag::Diagnostics;
use ztn_typeck::{ExternSig, TypedProgram};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to read `{path}`: {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker thread panicked while checking a unit")]
    WorkerPanicked,
}

/// Output of the front end for one unit. The typed program is only
/// meaningful for a backend when `diagnostics` carries no errors;
/// diagnostics are always complete either way.
pub struct UnitResult {
    pub file_id: usize,
    pub program: Program,
    pub typed: TypedProgram,
    pub diagnostics: Diagnostics,
}

impl UnitResult {
    pub fn is_verified(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Lex, parse, and check a single unit against a pre-resolved extern
/// symbol set.
pub fn compile_unit(
    source: &str,
    file_id: usize,
    externs: &HashMap<String, ExternSig>,
) -> UnitResult {
    let (program, mut diagnostics) = ztn_parser::parse(source, file_id);
    let (typed, check_diags) = ztn_typeck::check_unit(&program, externs);
    diagnostics.extend(check_diags);
    UnitResult {
        file_id,
        program,
        typed,
        diagnostics,
    }
}

/// Collects every top-level function signature across all units into the
/// extern index, with types rendered in surface syntax. This is the
/// barrier: it completes before any unit is checked.
pub fn build_extern_index(programs: &[Program]) -> HashMap<String, ExternSig> {
    let mut index = HashMap::new();
    for program in programs {
        for decl in &program.decls {
            if let Decl::Fn(f) = &decl.value {
                index.insert(
                    f.name.value.name.clone(),
                    ExternSig {
                        params: f.params.iter().map(|p| p.ty.value.to_string()).collect(),
                        ret: f.return_type.value.to_string(),
                    },
                );
            }
        }
    }
    index
}

/// Checks many units: a sequential parse pass feeds the extern index,
/// then each unit runs the full pipeline on its own worker thread. A
/// unit's own declarations shadow the index, so each unit can see every
/// other unit's functions without seeing stale copies of its own.
pub fn check_units(sources: &[(usize, String)]) -> Result<Vec<UnitResult>, DriverError> {
    let programs: Vec<Program> = sources
        .iter()
        .map(|(file_id, source)| ztn_parser::parse(source, *file_id).0)
        .collect();
    let index = build_extern_index(&programs);

    std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|(file_id, source)| {
                let index = &index;
                scope.spawn(move || compile_unit(source, *file_id, index))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| DriverError::WorkerPanicked))
            .collect()
    })
}

pub fn read_source(path: &Path) -> Result<String, DriverError> {
    std::fs::read_to_string(path).map_err(|source| DriverError::ReadSource {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_unit_clean() {
        let result = compile_unit(
            "fn add(a: i32, b: i32) -> i32 { return a + b; }",
            0,
            &HashMap::new(),
        );
        assert!(result.is_verified());
        assert_eq!(result.typed.functions.len(), 1);
    }

    #[test]
    fn test_extern_index_covers_all_units() {
        let sources = vec![
            (0, "fn one() -> i32 { return 1; }".to_string()),
            (1, "fn two() -> i32 { return one() + 1; }".to_string()),
        ];
        let programs: Vec<Program> = sources
            .iter()
            .map(|(id, src)| ztn_parser::parse(src, *id).0)
            .collect();
        let index = build_extern_index(&programs);
        assert_eq!(index.len(), 2);
        assert_eq!(index["one"].ret, "i32");
        assert!(index["one"].params.is_empty());
    }

    #[test]
    fn test_cross_unit_call_resolves() {
        let sources = vec![
            (0, "fn one() -> i32 { return 1; }".to_string()),
            (1, "fn two() -> i32 { return one() + 1; }".to_string()),
        ];
        let results = check_units(&sources).unwrap();
        assert!(results.iter().all(|r| r.is_verified()));
    }

    #[test]
    fn test_unit_errors_stay_per_unit() {
        let sources = vec![
            (0, "fn good() -> i32 { return 1; }".to_string()),
            (1, "fn bad() -> i32 { return \"x\"; }".to_string()),
        ];
        let results = check_units(&sources).unwrap();
        assert!(results[0].is_verified());
        assert!(!results[1].is_verified());
    }
}
