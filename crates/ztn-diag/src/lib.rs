//! # Zetan diagnostics
//!
//! Structured diagnostics shared by every compiler phase. Phases append
//! to a [`Diagnostics`] sink and return their partial result; nothing is
//! thrown across phase boundaries.

use std::fmt;

use ztn_ast::Span;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// Stable code identifying what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagCode {
    // Lexer
    UnterminatedString,
    InvalidNumber,
    InvalidCharacter,
    // Parser
    SyntaxError,
    // Registry
    DuplicateDeclaration,
    UnknownType,
    InheritanceCycle,
    // Type checker
    UnknownMember,
    TypeMismatch,
    InterfaceNotSatisfied,
    SignatureMismatch,
    UndefinedVariable,
    ArityMismatch,
    NotCallable,
    AssignToImmutable,
    // Ownership checker
    UseAfterMove,
    BorrowConflict,
    DanglingReference,
    // Warnings
    UnusedBinding,
}

impl DiagCode {
    /// Report code shown to the user, e.g. `E0201`.
    pub fn code_str(&self) -> &'static str {
        match self {
            DiagCode::UnterminatedString => "E0001",
            DiagCode::InvalidNumber => "E0002",
            DiagCode::InvalidCharacter => "E0003",
            DiagCode::SyntaxError => "E0100",
            DiagCode::DuplicateDeclaration => "E0200",
            DiagCode::UnknownType => "E0201",
            DiagCode::InheritanceCycle => "E0202",
            DiagCode::UnknownMember => "E0300",
            DiagCode::TypeMismatch => "E0301",
            DiagCode::InterfaceNotSatisfied => "E0302",
            DiagCode::SignatureMismatch => "E0303",
            DiagCode::UndefinedVariable => "E0304",
            DiagCode::ArityMismatch => "E0305",
            DiagCode::NotCallable => "E0306",
            DiagCode::AssignToImmutable => "E0307",
            DiagCode::UseAfterMove => "E0400",
            DiagCode::BorrowConflict => "E0401",
            DiagCode::DanglingReference => "E0402",
            DiagCode::UnusedBinding => "W0001",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            DiagCode::UnusedBinding => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A secondary label pointing at a related location.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub span: Span,
    pub message: String,
}

/// One collected diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagCode,
    pub message: String,
    pub span: Span,
    pub notes: Vec<Note>,
}

impl Diagnostic {
    pub fn error(code: DiagCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    pub fn warning(code: DiagCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, span: Span, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{}[{}]: {} at {}..{}",
            sev,
            self.code.code_str(),
            self.message,
            self.span.start,
            self.span.end
        )
    }
}

/// Append-only diagnostic sink for one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diags: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.diags.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.diags.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diags
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diags
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diags.len()
    }

    /// True if a diagnostic with the same code and primary span was
    /// already recorded. Used by the ownership checker's second loop
    /// pass to avoid duplicate reports.
    pub fn contains(&self, code: DiagCode, span: Span) -> bool {
        self.diags
            .iter()
            .any(|d| d.code == code && d.span == span)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diags
    }

    /// Move every diagnostic from `other` into this sink, preserving order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.diags.extend(other.diags);
    }
}

/// Maps byte offsets to 1-based line/column pairs for rendering.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Returns (line, column), both 1-based.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span::new(start, end, 0)
    }

    #[test]
    fn test_sink_counts() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_errors());

        diags.push(Diagnostic::warning(
            DiagCode::UnusedBinding,
            "unused binding `x`",
            span(0, 1),
        ));
        assert!(!diags.has_errors());
        assert_eq!(diags.warning_count(), 1);

        diags.push(Diagnostic::error(
            DiagCode::TypeMismatch,
            "expected i32, found String",
            span(4, 7),
        ));
        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_contains_dedup_key() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::error(
            DiagCode::UseAfterMove,
            "use of moved value `x`",
            span(10, 11),
        ));
        assert!(diags.contains(DiagCode::UseAfterMove, span(10, 11)));
        assert!(!diags.contains(DiagCode::UseAfterMove, span(12, 13)));
        assert!(!diags.contains(DiagCode::BorrowConflict, span(10, 11)));
    }

    #[test]
    fn test_notes() {
        let diag = Diagnostic::error(
            DiagCode::DuplicateDeclaration,
            "duplicate declaration of `Point`",
            span(40, 45),
        )
        .with_note(span(0, 5), "first declared here");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.notes[0].span, span(0, 5));
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nxyz");
        assert_eq!(index.position(0), (1, 1));
        assert_eq!(index.position(1), (1, 2));
        assert_eq!(index.position(3), (2, 1));
        assert_eq!(index.position(6), (3, 1));
        assert_eq!(index.position(7), (4, 1));
        assert_eq!(index.position(9), (4, 3));
    }
}
