//! # Zetan Lexer
//!
//! Converts raw source text into a token stream. Malformed input is
//! reported through diagnostics plus synthetic `Error` tokens so the
//! parser can attempt recovery rather than abort.

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use ztn_diag::DiagCode;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize()
    }

    #[test]
    fn test_keywords() {
        let tokens = lex("fn struct class interface let mut return if else while true false");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Fn,
                TokenKind::Struct,
                TokenKind::Class,
                TokenKind::Interface,
                TokenKind::Let,
                TokenKind::Mut,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_type_names_are_identifiers() {
        let tokens = lex("i32 f64 bool String");
        assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::Identifier));
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("123 45.67 0");
        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[0].text, "123");
        assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[1].text, "45.67");
        assert_eq!(tokens[2].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[2].text, "0");
    }

    #[test]
    fn test_trailing_dot_is_invalid_number() {
        let mut lexer = Lexer::new("let x = 1.;");
        let tokens = lexer.tokenize();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
        let diags = lexer.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().code, DiagCode::InvalidNumber);
    }

    #[test]
    fn test_leading_dot_is_not_a_float() {
        let tokens = lex(".5");
        assert_eq!(tokens[0].kind, TokenKind::Dot);
        assert_eq!(tokens[1].kind, TokenKind::IntLiteral);
    }

    #[test]
    fn test_strings() {
        let tokens = lex(r#""hello" "a b c""#);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].text, "a b c");
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"oops\nlet");
        let tokens = lexer.tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        // Scanning continues on the next line.
        assert_eq!(tokens[1].kind, TokenKind::Let);
        let diags = lexer.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags.iter().next().unwrap().code,
            DiagCode::UnterminatedString
        );
    }

    #[test]
    fn test_operators() {
        let tokens = lex("+ - * / % = == != ! < <= > >= && || & ->");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Eq,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::Bang,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Amp,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_whitespace_skipped() {
        let source = "// leading comment\nlet x = 5; // trailing\nlet";
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Eq);
        assert_eq!(tokens[3].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[4].kind, TokenKind::Semicolon);
        assert_eq!(tokens[5].kind, TokenKind::Let);
    }

    #[test]
    fn test_invalid_character() {
        let mut lexer = Lexer::new("let x = @;");
        let tokens = lexer.tokenize();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
        // Parsing can continue after the synthetic token.
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Semicolon));
        let diags = lexer.take_diagnostics();
        assert_eq!(
            diags.iter().next().unwrap().code,
            DiagCode::InvalidCharacter
        );
    }

    #[test]
    fn test_spans_slice_source_exactly() {
        let source = "fn add(a: i32, b: i32) -> i32 { return a + b; }";
        let tokens = lex(source);
        for token in tokens.iter().filter(|t| t.kind != TokenKind::Eof) {
            let slice = &source[token.span.start..token.span.end];
            if token.kind == TokenKind::StringLiteral {
                assert_eq!(slice, format!("\"{}\"", token.text));
            } else {
                assert_eq!(slice, token.text);
            }
        }
    }

    #[test]
    fn test_seek_restarts() {
        let source = "let x = 5;";
        let mut lexer = Lexer::new(source);
        let first = lexer.next_token();
        assert_eq!(first.kind, TokenKind::Let);
        let _ = lexer.tokenize();
        lexer.seek(first.span.start);
        let again = lexer.next_token();
        assert_eq!(again.kind, TokenKind::Let);
        assert_eq!(again.span, first.span);
    }
}
