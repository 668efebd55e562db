//! Parse error types

use std::fmt;

use ztn_ast::Span;
use ztn_diag::{DiagCode, Diagnostic};

/// A grammar violation carrying expected-vs-found information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub expected: String,
    pub found: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Self {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(
            DiagCode::SyntaxError,
            format!("expected {}, found {}", self.expected, self.found),
            self.span,
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "syntax error at {}..{}: expected {}, found {}",
            self.span.start, self.span.end, self.expected, self.found
        )
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;
