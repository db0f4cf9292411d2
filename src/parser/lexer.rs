//! Lexer (scanner) for calculator programs
//!
//! Converts a raw byte stream into [`ScannedToken`]s, one per call to
//! [`Lexer::scan_token`]. The lexer never aborts: a malformed lexeme is queued as a
//! [`LexError`] and scanning resumes right where the bad input ended, so the
//! parser above it always sees a well-formed token stream ending in `eof`.

use std::fmt;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Every token kind of the calculator language.
///
/// The set is closed: `repr(u8)` discriminants stay below 32 so that a
/// [`TokenSet`](super::grammar::TokenSet) fits in a single `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Token {
    // Keywords
    Int,
    Real,
    Trunc,
    Float,
    Read,
    Write,
    If,
    Then,
    End,
    While,
    Do,

    // Literal classes (these carry a lexeme)
    Id,
    INum,
    RNum,

    // Punctuation
    Gets,      // :=
    LParen,    // (
    RParen,    // )
    Semicolon, // ;

    // Relational operators
    Equal,          // == (spelled `=` in the grammar)
    NotEqual,       // <>
    Less,           // <
    Greater,        // >
    LessOrEqual,    // <=
    GreaterOrEqual, // >=

    // Arithmetic operators
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /

    // End of input
    Eof,
}

impl Token {
    /// Every token kind, in discriminant order.
    pub const ALL: [Token; 29] = [
        Token::Int,
        Token::Real,
        Token::Trunc,
        Token::Float,
        Token::Read,
        Token::Write,
        Token::If,
        Token::Then,
        Token::End,
        Token::While,
        Token::Do,
        Token::Id,
        Token::INum,
        Token::RNum,
        Token::Gets,
        Token::LParen,
        Token::RParen,
        Token::Semicolon,
        Token::Equal,
        Token::NotEqual,
        Token::Less,
        Token::Greater,
        Token::LessOrEqual,
        Token::GreaterOrEqual,
        Token::Add,
        Token::Sub,
        Token::Mul,
        Token::Div,
        Token::Eof,
    ];

    /// Looks up a keyword by its exact (case-sensitive) spelling.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "real" => Token::Real,
            "trunc" => Token::Trunc,
            "int" => Token::Int,
            "float" => Token::Float,
            "read" => Token::Read,
            "write" => Token::Write,
            "if" => Token::If,
            "then" => Token::Then,
            "end" => Token::End,
            "while" => Token::While,
            "do" => Token::Do,
            _ => return None,
        };
        Some(token)
    }

    /// True for the token classes that carry their source text.
    pub fn has_lexeme(self) -> bool {
        matches!(self, Token::Id | Token::INum | Token::RNum)
    }

    /// The name used in traces and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Token::Int => "int",
            Token::Real => "real",
            Token::Trunc => "trunc",
            Token::Float => "float",
            Token::Read => "read",
            Token::Write => "write",
            Token::If => "if",
            Token::Then => "then",
            Token::End => "end",
            Token::While => "while",
            Token::Do => "do",
            Token::Id => "id",
            Token::INum => "i_num",
            Token::RNum => "r_num",
            Token::Gets => ":=",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Semicolon => ";",
            Token::Equal => "=",
            Token::NotEqual => "<>",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LessOrEqual => "<=",
            Token::GreaterOrEqual => ">=",
            Token::Add => "+",
            Token::Sub => "-",
            Token::Mul => "*",
            Token::Div => "/",
            Token::Eof => "eof",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token as produced by the scanner: kind, optional text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedToken {
    pub token: Token,
    /// Source text, present only for `id`, `i_num` and `r_num`.
    pub lexeme: Option<String>,
    pub location: SourceLocation,
}

impl ScannedToken {
    pub fn new(token: Token, location: SourceLocation) -> Self {
        Self {
            token,
            lexeme: None,
            location,
        }
    }

    pub fn with_lexeme(token: Token, lexeme: String, location: SourceLocation) -> Self {
        Self {
            token,
            lexeme: Some(lexeme),
            location,
        }
    }
}

impl fmt::Display for ScannedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lexeme {
            Some(text) => write!(f, "{} ({})", self.token, text),
            None => write!(f, "{}", self.token),
        }
    }
}

/// The character a lexical error stumbled on, or end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offending(pub Option<u8>);

impl fmt::Display for Offending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(byte) if byte.is_ascii_graphic() || byte == b' ' => {
                write!(f, "'{}' (0x{:02x})", byte as char, byte)
            }
            Some(byte) => write!(f, "'\\x{:02x}' (0x{:02x})", byte, byte),
            None => write!(f, "end of input"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// No token starts with this character. It is dropped.
    #[error("lexical error at {location}: began with unexpected character {found}")]
    UnexpectedChar {
        found: Offending,
        location: SourceLocation,
    },

    /// A two-character operator was cut short (`:` or `=` alone).
    #[error("lexical error at {location}: expected '{expected}' after '{after}', got {found}")]
    ExpectedAfter {
        after: char,
        expected: char,
        found: Offending,
        location: SourceLocation,
    },

    /// A real literal is missing digits after `.` or after its exponent.
    #[error("lexical error at {location}: invalid real number, got {found} after {text}")]
    MalformedReal {
        text: String,
        found: Offending,
        location: SourceLocation,
    },
}

impl LexError {
    pub fn location(&self) -> SourceLocation {
        match self {
            LexError::UnexpectedChar { location, .. }
            | LexError::ExpectedAfter { location, .. }
            | LexError::MalformedReal { location, .. } => *location,
        }
    }
}

/// Lexer for calculator source text.
///
/// Holds exactly one byte of lookahead (`current`) between calls to
/// [`scan_token`](Lexer::scan_token); every multi-character lexeme ends by reading one
/// byte past itself, and that byte stays buffered for the next scan.
pub struct Lexer<I: Iterator<Item = u8>> {
    input: I,
    current: Option<u8>,
    line: usize,
    column: usize,
    errors: Vec<LexError>,
    done: bool,
}

impl<'a> Lexer<std::str::Bytes<'a>> {
    /// Create a new lexer for the given source string.
    pub fn new(source: &'a str) -> Self {
        Self::with_input(source.bytes())
    }
}

impl<I: Iterator<Item = u8>> Lexer<I> {
    /// Create a lexer pulling bytes on demand from `input`.
    pub fn with_input(mut input: I) -> Self {
        let current = input.next();
        Self {
            input,
            current,
            line: 1,
            column: 1,
            errors: Vec::new(),
            done: false,
        }
    }

    /// Scan the next token.
    ///
    /// Lexical errors do not surface here: each one is queued (see
    /// [`take_errors`](Lexer::take_errors)) and scanning restarts from the
    /// current position. Once input is exhausted every call returns `eof`.
    pub fn scan_token(&mut self) -> ScannedToken {
        loop {
            match self.next_token() {
                Ok(token) => {
                    log::trace!("scanned {} at {}", token, token.location);
                    return token;
                }
                Err(err) => {
                    log::warn!("{}", err);
                    self.errors.push(err);
                }
            }
        }
    }

    /// Tokenize the entire remaining input, `eof` included.
    pub fn tokenize(&mut self) -> Vec<ScannedToken> {
        self.by_ref().collect()
    }

    /// Lexical errors queued since the last call, oldest first.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn next_token(&mut self) -> Result<ScannedToken, LexError> {
        self.skip_whitespace();

        let loc = self.current_location();
        let Some(ch) = self.current else {
            return Ok(ScannedToken::new(Token::Eof, loc));
        };

        if ch.is_ascii_alphabetic() {
            return Ok(self.identifier_or_keyword(loc));
        }
        if ch.is_ascii_digit() {
            return self.number_literal(loc);
        }

        self.advance();
        let token = match ch {
            b':' => self.second_char(':', b'=', Token::Gets, loc)?,
            b'=' => self.second_char('=', b'=', Token::Equal, loc)?,
            b'<' => match self.current {
                Some(b'>') => {
                    self.advance();
                    Token::NotEqual
                }
                Some(b'=') => {
                    self.advance();
                    Token::LessOrEqual
                }
                _ => Token::Less,
            },
            b'>' => {
                if self.current == Some(b'=') {
                    self.advance();
                    Token::GreaterOrEqual
                } else {
                    Token::Greater
                }
            }
            b'+' => Token::Add,
            b'-' => Token::Sub,
            b'*' => Token::Mul,
            b'/' => Token::Div,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b';' => Token::Semicolon,
            _ => {
                return Err(LexError::UnexpectedChar {
                    found: Offending(Some(ch)),
                    location: loc,
                })
            }
        };

        Ok(ScannedToken::new(token, loc))
    }

    /// Finish a two-character operator whose first byte was just consumed.
    /// A wrong follower is left in place for the next scan.
    fn second_char(
        &mut self,
        first: char,
        expected: u8,
        token: Token,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        if self.current == Some(expected) {
            self.advance();
            Ok(token)
        } else {
            Err(LexError::ExpectedAfter {
                after: first,
                expected: expected as char,
                found: Offending(self.current),
                location: loc,
            })
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, loc: SourceLocation) -> ScannedToken {
        let mut ident = String::new();
        while let Some(ch) = self.current {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                ident.push(ch as char);
                self.advance();
            } else {
                break;
            }
        }

        match Token::keyword(&ident) {
            Some(keyword) => ScannedToken::new(keyword, loc),
            None => ScannedToken::with_lexeme(Token::Id, ident, loc),
        }
    }

    /// Parse numeric literal: `d+ ( . d+ ( [eE] [+-]? d+ )? )?`
    ///
    /// The lexeme is kept verbatim; no numeric conversion happens here.
    fn number_literal(&mut self, loc: SourceLocation) -> Result<ScannedToken, LexError> {
        let mut text = String::new();
        self.take_digits(&mut text);

        if self.current != Some(b'.') {
            return Ok(ScannedToken::with_lexeme(Token::INum, text, loc));
        }
        self.take_current(&mut text);
        if !self.at_digit() {
            return Err(self.malformed_real(text, loc));
        }
        self.take_digits(&mut text);

        if matches!(self.current, Some(b'e' | b'E')) {
            self.take_current(&mut text);
            if matches!(self.current, Some(b'+' | b'-')) {
                self.take_current(&mut text);
            }
            if !self.at_digit() {
                return Err(self.malformed_real(text, loc));
            }
            self.take_digits(&mut text);
        }

        Ok(ScannedToken::with_lexeme(Token::RNum, text, loc))
    }

    fn malformed_real(&self, text: String, loc: SourceLocation) -> LexError {
        LexError::MalformedReal {
            text,
            found: Offending(self.current),
            location: loc,
        }
    }

    fn take_digits(&mut self, text: &mut String) {
        while self.at_digit() {
            self.take_current(text);
        }
    }

    fn take_current(&mut self, text: &mut String) {
        if let Some(ch) = self.current {
            text.push(ch as char);
            self.advance();
        }
    }

    fn at_digit(&self) -> bool {
        self.current.is_some_and(|ch| ch.is_ascii_digit())
    }

    fn skip_whitespace(&mut self) {
        // Same class as C's isspace: includes vertical tab and form feed.
        while matches!(
            self.current,
            Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
        ) {
            self.advance();
        }
    }

    /// Advance to next character
    fn advance(&mut self) {
        if self.current.is_none() {
            return;
        }
        if self.current == Some(b'\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.current = self.input.next();
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl<I: Iterator<Item = u8>> Iterator for Lexer<I> {
    type Item = ScannedToken;

    /// Yields tokens up to and including the first `eof`.
    fn next(&mut self) -> Option<ScannedToken> {
        if self.done {
            return None;
        }
        let token = self.scan_token();
        self.done = token.token == Token::Eof;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_whitespace_only_is_eof() {
        for source in ["", " ", "\n\t  \r\n", "\x0b\x0c"] {
            let mut lexer = Lexer::new(source);
            let token = lexer.scan_token();
            assert_eq!(token.token, Token::Eof);
            assert_eq!(token.lexeme, None);
            // eof is sticky
            assert_eq!(lexer.scan_token().token, Token::Eof);
        }
    }

    #[test]
    fn test_keywords() {
        for word in [
            "real", "trunc", "int", "float", "read", "write", "if", "then", "end", "while", "do",
        ] {
            let tokens = Lexer::new(word).tokenize();
            let expected = Token::keyword(word).unwrap();
            assert_eq!(tokens[0].token, expected);
            assert_eq!(tokens[0].lexeme, None);
            assert_eq!(tokens[1].token, Token::Eof);
        }
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        for source in ["int1", "reals", "do_", "whilex", "End", "IF"] {
            let tokens = Lexer::new(source).tokenize();
            assert_eq!(tokens[0].token, Token::Id, "{}", source);
            assert_eq!(tokens[0].lexeme.as_deref(), Some(source));
            assert_eq!(tokens.len(), 2);
        }
    }

    #[test]
    fn test_numbers_keep_their_text() {
        let cases = [
            ("0", Token::INum),
            ("42", Token::INum),
            ("3.14", Token::RNum),
            ("10.0e5", Token::RNum),
            ("1.5E-3", Token::RNum),
            ("7.25e+12", Token::RNum),
        ];
        for (source, kind) in cases {
            let mut lexer = Lexer::new(source);
            let token = lexer.scan_token();
            assert_eq!(token.token, kind);
            assert_eq!(token.lexeme.as_deref(), Some(source));
            assert!(!lexer.has_errors());
        }
    }

    #[test]
    fn test_integer_followed_by_exponent_letter() {
        // Without a fraction the exponent is not part of the literal.
        let tokens = Lexer::new("12e3").tokenize();
        assert_eq!(tokens[0].token, Token::INum);
        assert_eq!(tokens[0].lexeme.as_deref(), Some("12"));
        assert_eq!(tokens[1].token, Token::Id);
        assert_eq!(tokens[1].lexeme.as_deref(), Some("e3"));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds(":= ( ) ; == <> < > <= >= + - * /"),
            vec![
                Token::Gets,
                Token::LParen,
                Token::RParen,
                Token::Semicolon,
                Token::Equal,
                Token::NotEqual,
                Token::Less,
                Token::Greater,
                Token::LessOrEqual,
                Token::GreaterOrEqual,
                Token::Add,
                Token::Sub,
                Token::Mul,
                Token::Div,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_maximal_munch_without_spaces() {
        assert_eq!(
            kinds("x:=y<=3>>z<>1"),
            vec![
                Token::Id,
                Token::Gets,
                Token::Id,
                Token::LessOrEqual,
                Token::INum,
                Token::Greater,
                Token::Greater,
                Token::Id,
                Token::NotEqual,
                Token::INum,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_colon_recovers() {
        let mut lexer = Lexer::new("x : y");
        let tokens = lexer.tokenize();
        let kinds: Vec<Token> = tokens.iter().map(|t| t.token).collect();
        assert_eq!(kinds, vec![Token::Id, Token::Id, Token::Eof]);

        let errors = lexer.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            LexError::ExpectedAfter {
                after: ':',
                expected: '=',
                found: Offending(Some(b' ')),
                ..
            }
        ));
        assert!(lexer.take_errors().is_empty());
    }

    #[test]
    fn test_single_equal_is_an_error() {
        let mut lexer = Lexer::new("a = b");
        assert_eq!(
            lexer.tokenize().iter().map(|t| t.token).collect::<Vec<_>>(),
            vec![Token::Id, Token::Id, Token::Eof]
        );
        let errors = lexer.take_errors();
        assert_eq!(errors.len(), 1);
        let message = errors[0].to_string();
        assert!(message.contains("expected '=' after '='"), "{}", message);
        assert!(message.contains("0x20"), "{}", message);
    }

    #[test]
    fn test_colon_at_end_of_input() {
        let mut lexer = Lexer::new(":");
        assert_eq!(lexer.scan_token().token, Token::Eof);
        let errors = lexer.take_errors();
        assert!(errors[0].to_string().contains("end of input"));
    }

    #[test]
    fn test_malformed_reals_resume_at_offending_char() {
        let mut lexer = Lexer::new("1.x 2.5e; 3.5e-");
        let tokens = lexer.tokenize();
        let kinds: Vec<Token> = tokens.iter().map(|t| t.token).collect();
        assert_eq!(kinds, vec![Token::Id, Token::Semicolon, Token::Eof]);
        assert_eq!(tokens[0].lexeme.as_deref(), Some("x"));

        let errors = lexer.take_errors();
        assert_eq!(errors.len(), 3);
        match &errors[1] {
            LexError::MalformedReal { text, found, .. } => {
                assert_eq!(text, "2.5e");
                assert_eq!(*found, Offending(Some(b';')));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(
            &errors[2],
            LexError::MalformedReal { text, found: Offending(None), .. } if text == "3.5e-"
        ));
    }

    #[test]
    fn test_unexpected_character_is_skipped() {
        let mut lexer = Lexer::new("a # $b");
        let tokens = lexer.tokenize();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].lexeme.as_deref(), Some("b"));

        let errors = lexer.take_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "lexical error at line 1, column 3: began with unexpected character '#' (0x23)"
        );
    }

    #[test]
    fn test_locations() {
        let tokens = Lexer::new("int x\n  := 10;").tokenize();
        let locations: Vec<(usize, usize)> = tokens
            .iter()
            .map(|t| (t.location.line, t.location.column))
            .collect();
        assert_eq!(locations, vec![(1, 1), (1, 5), (2, 3), (2, 6), (2, 8), (2, 9)]);
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let mut lexer = Lexer::new("x");
        assert!(lexer.next().is_some());
        assert_eq!(lexer.next().map(|t| t.token), Some(Token::Eof));
        assert_eq!(lexer.next(), None);
    }
}
