//! Token definitions for Zetan source.

use ztn_ast::Span;

/// The different kinds of tokens in Zetan.
///
/// Keywords are identifiers matched against the reserved-word set after
/// scanning; primitive type names (`i32`, `f64`, `bool`, `String`) stay
/// plain identifiers and are resolved later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Fn,
    Struct,
    Class,
    Interface,
    Extends,
    Implements,
    Let,
    Mut,
    Return,
    If,
    Else,
    While,
    True,
    False,

    // Literals
    IntLiteral,
    FloatLiteral,
    StringLiteral,

    // Identifier
    Identifier,

    // Operators
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Percent,   // %
    Eq,        // =
    EqEq,      // ==
    BangEq,    // !=
    Bang,      // !
    Lt,        // <
    LtEq,      // <=
    Gt,        // >
    GtEq,      // >=
    AmpAmp,    // &&
    PipePipe,  // ||
    Amp,       // &
    Arrow,     // ->

    // Delimiters
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .
    Colon,     // :

    // Special
    Eof,
    Error,
}

/// A token with its kind, span, and source text.
///
/// For string literals `text` holds the unquoted contents; for every
/// other kind it is the exact source slice covered by `span`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, text: String) -> Self {
        Self { kind, span, text }
    }
}
