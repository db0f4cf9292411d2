//! Calculator language front end
//!
//! This module recognizes calculator programs:
//! - [`lexer`]: Scanning (bytes → tokens), with local recovery from bad lexemes
//! - [`grammar`]: Nonterminals, productions and the FIRST/FOLLOW token sets
//! - [`parse`]: The [`Parser`] and its panic-mode recovery
//!
//! # Supported Language
//!
//! - Declarations: `int x := e`, `real y := e`
//! - Assignment, `read [int|real] x`, `write e`
//! - `if c then ... end`, `while c do ... end`, statements end with `;`
//! - Expressions over `+ - * /`, parentheses, `trunc(e)` and `float(e)`
//! - Conditions `e ro e` with `== <> < > <= >=`
//!
//! # Parser Implementation
//!
//! Hand-written predictive recursive descent, one procedure per nonterminal.
//! Nothing is built: the parser only decides whether the input is a sentence
//! and reports what it predicted and matched along the way.

mod expressions;
pub mod grammar;
pub mod lexer;
pub mod parse;
mod statements;

pub use grammar::{NonTerminal, Production, TokenSet};
pub use lexer::{LexError, Lexer, ScannedToken, SourceLocation, Token};
pub use parse::{Diagnostic, ParseError, ParseOutcome, Parser, RecoveryMode, SyntaxError};

use crate::trace::ParseListener;

/// Recognize everything `lexer` produces, reporting to `listener`.
///
/// A strict-mode stop is folded into the outcome as its only diagnostic; the
/// listener has already been told about it, so nothing else reports it.
pub fn recognize_from<I, L>(
    lexer: Lexer<I>,
    listener: L,
    mode: RecoveryMode,
) -> (ParseOutcome, L)
where
    I: Iterator<Item = u8>,
    L: ParseListener,
{
    let mut parser = Parser::with_lexer(lexer, listener, mode);
    let outcome = match parser.parse() {
        Ok(outcome) => outcome,
        Err(err) => ParseOutcome {
            diagnostics: vec![err.diagnostic],
        },
    };
    (outcome, parser.into_listener())
}

/// Recognize `source` in resilient mode, reporting to `listener`.
pub fn recognize_with<L: ParseListener>(source: &str, listener: L) -> (ParseOutcome, L) {
    recognize_from(Lexer::new(source), listener, RecoveryMode::Resilient)
}

/// Recognize `source` in resilient mode.
pub fn recognize(source: &str) -> ParseOutcome {
    recognize_with(source, ()).0
}
