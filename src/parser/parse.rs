//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the machinery shared by all
//! recognition procedures: the one-token lookahead cell, the `match`
//! primitive, diagnostics, and panic-mode recovery.
//!
//! # Parser Architecture
//!
//! The Parser is a predictive (LL(1)) recursive-descent recognizer:
//! - This module: Parser struct, error types, `match`, recovery
//! - `statements`: `program`, `stmt_list`, `stmt`, `type`
//! - `expressions`: `condition`, `expr`, `term`, `factor` and their tails and operators
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks.
//! Every procedure body returns a [`Step`]; a rejected token or a failed
//! `match` inside the body hands control to [`Parser::nonterminal`], which
//! runs panic-mode recovery for that nonterminal. Only strict mode lets an
//! error escape, as a [`ParseError`].

use crate::parser::grammar::{NonTerminal, Production};
use crate::parser::lexer::{LexError, Lexer, ScannedToken, SourceLocation, Token};
use crate::trace::ParseListener;
use thiserror::Error;

/// Syntax error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// `match` was called with an expected token that differs from the lookahead.
    #[error("syntax error at {location}: got {found}, expected {expected}")]
    Mismatch {
        expected: Token,
        found: Token,
        location: SourceLocation,
    },

    /// No production of the nonterminal is selected by the lookahead.
    #[error("syntax error at {location}: unexpected {found} in {nonterminal}")]
    Unexpected {
        nonterminal: NonTerminal,
        found: Token,
        location: SourceLocation,
    },
}

impl SyntaxError {
    pub fn location(&self) -> SourceLocation {
        match self {
            SyntaxError::Mismatch { location, .. } | SyntaxError::Unexpected { location, .. } => {
                *location
            }
        }
    }
}

/// Anything reported on the diagnostic channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error(transparent)]
    Lexical(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Diagnostic {
    pub fn location(&self) -> SourceLocation {
        match self {
            Diagnostic::Lexical(err) => err.location(),
            Diagnostic::Syntax(err) => err.location(),
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Diagnostic::Lexical(_))
    }
}

/// Parse error type, raised only in [`RecoveryMode::Strict`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parsing stopped: {diagnostic}")]
pub struct ParseError {
    pub diagnostic: Diagnostic,
}

/// What the parser does with the first error it meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Report every error, resynchronize, and continue to end of input.
    #[default]
    Resilient,
    /// Stop at the first lexical or syntax error.
    Strict,
}

/// Result of a complete (resilient) recognition run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// A program is accepted when it produced no diagnostics at all.
    pub fn is_accepted(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn lexical_errors(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_lexical()).count()
    }

    pub fn syntax_errors(&self) -> usize {
        self.diagnostics.len() - self.lexical_errors()
    }
}

/// Why a procedure body stopped early.
pub(crate) enum Fault {
    /// Recover inside the current nonterminal.
    Reject(SyntaxError),
    /// Strict mode: unwind to the caller of [`Parser::parse`].
    Abort(ParseError),
}

impl From<ParseError> for Fault {
    fn from(err: ParseError) -> Self {
        Fault::Abort(err)
    }
}

pub(crate) type Step = Result<(), Fault>;

/// Where panic-mode recovery left the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resync {
    /// The lookahead starts the nonterminal again.
    Restart,
    /// The lookahead may follow the nonterminal, or input is exhausted.
    Done,
}

/// Recursive descent recognizer for the calculator language
pub struct Parser<I: Iterator<Item = u8>, L: ParseListener> {
    pub(crate) lexer: Lexer<I>,
    pub(crate) lookahead: ScannedToken,
    pub(crate) listener: L,
    mode: RecoveryMode,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<std::str::Bytes<'a>, ()> {
    /// Resilient parser over a source string, without a trace listener.
    pub fn new(source: &'a str) -> Self {
        Parser::with_lexer(Lexer::new(source), (), RecoveryMode::Resilient)
    }
}

impl<I: Iterator<Item = u8>, L: ParseListener> Parser<I, L> {
    /// Create a parser and prime its lookahead with the first token.
    pub fn with_lexer(mut lexer: Lexer<I>, listener: L, mode: RecoveryMode) -> Self {
        let lookahead = lexer.scan_token();
        Self {
            lexer,
            lookahead,
            listener,
            mode,
            diagnostics: Vec::new(),
        }
    }

    /// Recognize a whole `Program`.
    ///
    /// In resilient mode this always returns `Ok`; the outcome lists every
    /// diagnostic in the order it was found. In strict mode the first
    /// diagnostic comes back as `Err`.
    pub fn parse(&mut self) -> Result<ParseOutcome, ParseError> {
        // Errors met while priming the lookahead.
        self.flush_lex_errors()?;
        self.program()?;
        Ok(ParseOutcome {
            diagnostics: std::mem::take(&mut self.diagnostics),
        })
    }

    pub fn mode(&self) -> RecoveryMode {
        self.mode
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    // ===== Helper methods =====

    /// Run one nonterminal's procedure body, recovering from a local error.
    ///
    /// When recovery lands on a token in FIRST(`nt`), the body simply runs
    /// again from the top.
    pub(crate) fn nonterminal(
        &mut self,
        nt: NonTerminal,
        body: fn(&mut Self) -> Step,
    ) -> Result<(), ParseError> {
        loop {
            match body(self) {
                Ok(()) => return Ok(()),
                Err(Fault::Abort(err)) => return Err(err),
                Err(Fault::Reject(err)) => {
                    if self.recover(nt, err)? == Resync::Done {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Run a right-recursive tail `nt ::= ... nt | ε` as a loop.
    ///
    /// `body` handles one round: it returns `Ok(true)` after recognizing the
    /// non-empty alternative up to the recursive `nt`, and `Ok(false)` once it
    /// has predicted the ε-production. Each round traces exactly what one
    /// level of recursion would.
    pub(crate) fn repeat(
        &mut self,
        nt: NonTerminal,
        body: fn(&mut Self) -> Result<bool, Fault>,
    ) -> Result<(), ParseError> {
        loop {
            let more = match body(self) {
                Ok(more) => more,
                Err(Fault::Abort(err)) => return Err(err),
                Err(Fault::Reject(err)) => self.recover(nt, err)? == Resync::Restart,
            };
            if !more {
                return Ok(());
            }
        }
    }

    /// Panic-mode recovery.
    ///
    /// Discards tokens until one either starts `nt` (then `nt` is recognized
    /// again from scratch) or may follow it (then `nt` counts as done). `eof`
    /// always stops the loop.
    fn recover(&mut self, nt: NonTerminal, err: SyntaxError) -> Result<Resync, ParseError> {
        log::debug!("recovering in {} from: {}", nt, err);
        self.report(Diagnostic::Syntax(err))?;

        loop {
            let token = self.lookahead.token;
            if nt.first().contains(token) {
                log::debug!("resuming {} at {}", nt, self.lookahead);
                return Ok(Resync::Restart);
            }
            if nt.follow().contains(token) || token == Token::Eof {
                log::debug!("abandoning {} at {}", nt, self.lookahead);
                return Ok(Resync::Done);
            }
            log::debug!("discarding {} at {}", self.lookahead, self.lookahead.location);
            self.listener.skipped(&self.lookahead);
            self.advance()?;
        }
    }

    /// The `match` primitive: consume `expected` or fail without advancing.
    pub(crate) fn match_token(&mut self, expected: Token) -> Step {
        if self.lookahead.token == expected {
            self.listener.matched(&self.lookahead);
            self.advance()?;
            Ok(())
        } else {
            Err(Fault::Reject(SyntaxError::Mismatch {
                expected,
                found: self.lookahead.token,
                location: self.lookahead.location,
            }))
        }
    }

    /// Record the production chosen for the current lookahead.
    pub(crate) fn predict(&mut self, production: Production) {
        log::trace!("predict {}", production);
        self.listener.predict(production, self.lookahead.location);
    }

    /// The error for a lookahead that selects no production of `nt`.
    pub(crate) fn reject(&self, nt: NonTerminal) -> Fault {
        Fault::Reject(SyntaxError::Unexpected {
            nonterminal: nt,
            found: self.lookahead.token,
            location: self.lookahead.location,
        })
    }

    pub(crate) fn peek(&self) -> Token {
        self.lookahead.token
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.lookahead = self.lexer.scan_token();
        self.flush_lex_errors()
    }

    fn flush_lex_errors(&mut self) -> Result<(), ParseError> {
        for err in self.lexer.take_errors() {
            self.report(Diagnostic::Lexical(err))?;
        }
        Ok(())
    }

    fn report(&mut self, diagnostic: Diagnostic) -> Result<(), ParseError> {
        self.listener.diagnostic(&diagnostic);
        match self.mode {
            RecoveryMode::Strict => Err(ParseError { diagnostic }),
            RecoveryMode::Resilient => {
                self.diagnostics.push(diagnostic);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{TraceEvent, TraceLog};

    fn parse(source: &str) -> ParseOutcome {
        Parser::new(source).parse().unwrap()
    }

    #[test]
    fn test_empty_program_is_accepted() {
        assert!(parse("").is_accepted());
        assert!(parse("   \n ").is_accepted());
    }

    #[test]
    fn test_parse_statements() {
        let source = "int x := 1 + 2 * 3; real y := x / 2.5; read int z; read w; write (x - y) * z;";
        assert_eq!(parse(source).diagnostics, vec![]);
    }

    #[test]
    fn test_parse_nested_control_flow() {
        let source = r#"
            int n := 10;
            while n > 0 do
                if trunc(float(n) / 2.0) * 2 <> n then
                    write n;
                end;
                n := n - 1;
            end;
        "#;
        assert!(parse(source).is_accepted());
    }

    #[test]
    fn test_missing_identifier_recovers() {
        let outcome = parse("int := ; end");
        assert!(!outcome.is_accepted());
        assert_eq!(
            outcome.diagnostics[0],
            Diagnostic::Syntax(SyntaxError::Mismatch {
                expected: Token::Id,
                found: Token::Gets,
                location: SourceLocation::new(1, 5),
            })
        );
    }

    #[test]
    fn test_mismatch_does_not_consume() {
        // `:=` is missing: the second `x` is kept and restarts the statement.
        let mut parser = Parser::with_lexer(
            Lexer::new("int x x := 1;"),
            TraceLog::new(),
            RecoveryMode::Resilient,
        );
        let outcome = parser.parse().unwrap();
        let trace = parser.into_listener();

        assert_eq!(outcome.syntax_errors(), 1);
        let matched_x = trace
            .events()
            .iter()
            .filter(|e| matches!(e, TraceEvent::Match { token } if token.lexeme.as_deref() == Some("x")))
            .count();
        assert_eq!(matched_x, 2);
        assert!(!trace
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::Skip { .. })));
    }

    #[test]
    fn test_recovery_skips_to_follow_set() {
        // The stray `x` after `b` cannot continue the condition and is discarded.
        let mut parser = Parser::with_lexer(
            Lexer::new("if a < b x := 1; end;"),
            TraceLog::new(),
            RecoveryMode::Resilient,
        );
        let outcome = parser.parse().unwrap();
        let trace = parser.into_listener();

        assert_eq!(outcome.syntax_errors(), 3);
        assert!(matches!(
            outcome.diagnostics[0],
            Diagnostic::Syntax(SyntaxError::Unexpected {
                nonterminal: NonTerminal::FactorTail,
                found: Token::Id,
                ..
            })
        ));
        let skipped: Vec<String> = trace
            .events()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Skip { token } => Some(token.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec!["id (x)", ":=", "i_num (1)", "end", ";"]);
    }

    #[test]
    fn test_unexpected_token_reports_nonterminal() {
        let outcome = parse("write * 2;");
        assert!(matches!(
            outcome.diagnostics[0],
            Diagnostic::Syntax(SyntaxError::Unexpected {
                nonterminal: NonTerminal::Expr,
                found: Token::Mul,
                ..
            })
        ));
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn test_lexical_errors_reach_the_outcome() {
        let outcome = parse("int x := 1 @ ;");
        assert_eq!(outcome.lexical_errors(), 1);
        assert_eq!(outcome.syntax_errors(), 0);
    }

    #[test]
    fn test_tails_trace_like_right_recursion() {
        use Production::*;

        let mut parser = Parser::with_lexer(
            Lexer::new("a := 1 + 2 * 3 * 4 - 5; b := 6;"),
            TraceLog::new(),
            RecoveryMode::Resilient,
        );
        assert!(parser.parse().unwrap().is_accepted());
        let predicted: Vec<Production> = parser.into_listener().productions().collect();

        assert_eq!(
            predicted,
            vec![
                Program,
                StmtListStmt,
                StmtAssign,
                Expr,
                Term,
                FactorINum,
                FactorTailEmpty,
                TermTailAdd,
                AddOpAdd,
                Term,
                FactorINum,
                FactorTailMul,
                MulOpMul,
                FactorINum,
                FactorTailMul,
                MulOpMul,
                FactorINum,
                FactorTailEmpty,
                TermTailAdd,
                AddOpSub,
                Term,
                FactorINum,
                FactorTailEmpty,
                TermTailEmpty,
                StmtListStmt,
                StmtAssign,
                Expr,
                Term,
                FactorINum,
                FactorTailEmpty,
                TermTailEmpty,
                StmtListEmpty,
            ]
        );
    }

    #[test]
    fn test_bad_statement_list_token_resumes_the_list() {
        // `)` starts nothing; recovery skips it and the list carries on.
        let mut parser = Parser::with_lexer(
            Lexer::new("x := 1; ) y := 2;"),
            TraceLog::new(),
            RecoveryMode::Resilient,
        );
        let outcome = parser.parse().unwrap();
        let trace = parser.into_listener();

        assert_eq!(outcome.syntax_errors(), 1);
        assert!(matches!(
            outcome.diagnostics[0],
            Diagnostic::Syntax(SyntaxError::Unexpected {
                nonterminal: NonTerminal::StmtList,
                found: Token::RParen,
                ..
            })
        ));
        let assignments = trace
            .productions()
            .filter(|p| *p == Production::StmtAssign)
            .count();
        assert_eq!(assignments, 2);
    }

    #[test]
    fn test_strict_mode_stops_at_first_error() {
        let mut parser = Parser::with_lexer(
            Lexer::new("int := 1; write $; x := ;"),
            (),
            RecoveryMode::Strict,
        );
        let err = parser.parse().unwrap_err();
        assert!(matches!(
            err.diagnostic,
            Diagnostic::Syntax(SyntaxError::Mismatch {
                expected: Token::Id,
                ..
            })
        ));
    }

    #[test]
    fn test_strict_mode_stops_on_lexical_error() {
        let mut parser =
            Parser::with_lexer(Lexer::new("# x := 1;"), (), RecoveryMode::Strict);
        let err = parser.parse().unwrap_err();
        assert!(err.diagnostic.is_lexical());
    }

    #[test]
    fn test_strict_mode_accepts_valid_program() {
        let mut parser =
            Parser::with_lexer(Lexer::new("x := 1;"), (), RecoveryMode::Strict);
        assert_eq!(parser.mode(), RecoveryMode::Strict);
        assert!(parser.parse().unwrap().is_accepted());
    }
}
