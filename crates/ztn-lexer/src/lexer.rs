//! The Zetan scanner.

use ztn_ast::Span;
use ztn_diag::{DiagCode, Diagnostic, Diagnostics};

use crate::token::{Token, TokenKind};

/// Hand-rolled lexer producing a lazy token sequence plus diagnostics
/// for malformed input. Restartable via [`Lexer::seek`].
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    base: usize,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
    diags: Diagnostics,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            base: 0,
            current_pos: 0,
            current_char,
            file_id,
            diags: Diagnostics::new(),
        }
    }

    /// Restarts scanning at the given byte offset.
    pub fn seek(&mut self, pos: usize) {
        let pos = pos.min(self.source.len());
        self.base = pos;
        self.chars = self.source[pos..].char_indices();
        self.current_char = self.chars.next().map(|(_, c)| c);
        self.current_pos = pos;
    }

    /// Tokenizes the entire source and returns all tokens, ending with Eof.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Takes the diagnostics collected so far, leaving an empty sink.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diags)
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.current_pos;

        match self.current_char {
            None => Token::new(TokenKind::Eof, self.span_from(start), String::new()),
            Some(ch) => match ch {
                '"' => self.read_string_literal(),
                '0'..='9' => self.read_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.read_identifier_or_keyword(),
                '+' => self.single(TokenKind::Plus),
                '-' => {
                    self.advance();
                    if self.current_char == Some('>') {
                        self.advance();
                        Token::new(TokenKind::Arrow, self.span_from(start), "->".to_string())
                    } else {
                        Token::new(TokenKind::Minus, self.span_from(start), "-".to_string())
                    }
                }
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                '%' => self.single(TokenKind::Percent),
                '=' => self.one_or_two('=', TokenKind::Eq, TokenKind::EqEq),
                '!' => self.one_or_two('=', TokenKind::Bang, TokenKind::BangEq),
                '<' => self.one_or_two('=', TokenKind::Lt, TokenKind::LtEq),
                '>' => self.one_or_two('=', TokenKind::Gt, TokenKind::GtEq),
                '&' => self.one_or_two('&', TokenKind::Amp, TokenKind::AmpAmp),
                '|' => {
                    self.advance();
                    if self.current_char == Some('|') {
                        self.advance();
                        Token::new(TokenKind::PipePipe, self.span_from(start), "||".to_string())
                    } else {
                        self.error_token(start, DiagCode::InvalidCharacter, "unexpected character `|`")
                    }
                }
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                ';' => self.single(TokenKind::Semicolon),
                ',' => self.single(TokenKind::Comma),
                '.' => self.single(TokenKind::Dot),
                ':' => self.single(TokenKind::Colon),
                _ => {
                    self.advance();
                    self.error_token(
                        start,
                        DiagCode::InvalidCharacter,
                        format!("unexpected character `{}`", ch),
                    )
                }
            },
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = self.base + pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.current_pos, self.file_id)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.current_pos;
        let text = self.current_char.map(String::from).unwrap_or_default();
        self.advance();
        Token::new(kind, self.span_from(start), text)
    }

    fn one_or_two(&mut self, second: char, one: TokenKind, two: TokenKind) -> Token {
        let start = self.current_pos;
        let first = self.current_char.unwrap_or('\0');
        self.advance();
        if self.current_char == Some(second) {
            self.advance();
            Token::new(two, self.span_from(start), format!("{}{}", first, second))
        } else {
            Token::new(one, self.span_from(start), first.to_string())
        }
    }

    fn error_token(
        &mut self,
        start: usize,
        code: DiagCode,
        message: impl Into<String>,
    ) -> Token {
        let message = message.into();
        let span = self.span_from(start);
        self.diags.push(Diagnostic::error(code, message.clone(), span));
        Token::new(TokenKind::Error, span, message)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek() == Some('/') => {
                    while let Some(ch) = self.current_char {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_string_literal(&mut self) -> Token {
        let start = self.current_pos;
        self.advance(); // opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char {
            match ch {
                '"' => {
                    self.advance(); // closing quote
                    return Token::new(TokenKind::StringLiteral, self.span_from(start), value);
                }
                '\n' => {
                    return self.error_token(
                        start,
                        DiagCode::UnterminatedString,
                        "unterminated string literal",
                    );
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        self.error_token(
            start,
            DiagCode::UnterminatedString,
            "unterminated string literal",
        )
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char == Some('.') {
            if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                value.push('.');
                self.advance();
                while let Some(ch) = self.current_char {
                    if ch.is_ascii_digit() {
                        value.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
                return Token::new(TokenKind::FloatLiteral, self.span_from(start), value);
            }
            // A trailing dot with no fractional digits is not a float
            // and Zetan has no members on numeric literals.
            self.advance();
            return self.error_token(
                start,
                DiagCode::InvalidNumber,
                format!("malformed float literal `{}.`", value),
            );
        }

        Token::new(TokenKind::IntLiteral, self.span_from(start), value)
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match value.as_str() {
            "fn" => TokenKind::Fn,
            "struct" => TokenKind::Struct,
            "class" => TokenKind::Class,
            "interface" => TokenKind::Interface,
            "extends" => TokenKind::Extends,
            "implements" => TokenKind::Implements,
            "let" => TokenKind::Let,
            "mut" => TokenKind::Mut,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier,
        };

        Token::new(kind, self.span_from(start), value)
    }
}
