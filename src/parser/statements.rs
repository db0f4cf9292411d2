//! Statement recognition
//!
//! This module handles the statement level of the grammar:
//!
//! - Declarations with initializer: `int x := expr`, `real y := expr`
//! - Assignment: `x := expr`
//! - I/O: `read [int|real] x`, `write expr`
//! - Control flow: `if cond then ... end`, `while cond do ... end`
//!
//! # Grammar
//!
//! ```text
//! program   ::= stmt_list eof
//! stmt_list ::= stmt ';' stmt_list | ε
//! type      ::= 'int' | 'real' | ε
//! ```
//!
//! All recognition methods are implemented as `pub(crate)` methods on the [`Parser`] struct.
//! `stmt_list` runs as a loop, so long programs do not deepen the call stack.

use crate::parser::grammar::{NonTerminal, Production};
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};
use crate::trace::ParseListener;

impl<I: Iterator<Item = u8>, L: ParseListener> Parser<I, L> {
    pub(crate) fn program(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::Program, |p| {
            match p.peek() {
                Token::Int
                | Token::Real
                | Token::Id
                | Token::Read
                | Token::Write
                | Token::If
                | Token::While
                | Token::Eof => {
                    p.predict(Production::Program);
                    p.stmt_list()?;
                    p.match_token(Token::Eof)?;
                }
                _ => return Err(p.reject(NonTerminal::Program)),
            }
            Ok(())
        })
    }

    /// `stmt ';' stmt_list | ε`, one statement per round.
    pub(crate) fn stmt_list(&mut self) -> Result<(), ParseError> {
        self.repeat(NonTerminal::StmtList, |p| {
            match p.peek() {
                Token::Int
                | Token::Real
                | Token::Id
                | Token::Read
                | Token::Write
                | Token::If
                | Token::While => {
                    p.predict(Production::StmtListStmt);
                    p.stmt()?;
                    p.match_token(Token::Semicolon)?;
                }
                Token::End | Token::Eof => {
                    p.predict(Production::StmtListEmpty);
                    return Ok(false);
                }
                _ => return Err(p.reject(NonTerminal::StmtList)),
            }
            Ok(true)
        })
    }

    pub(crate) fn stmt(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::Stmt, |p| {
            match p.peek() {
                Token::Int => {
                    p.predict(Production::StmtIntDecl);
                    p.match_token(Token::Int)?;
                    p.match_token(Token::Id)?;
                    p.match_token(Token::Gets)?;
                    p.expr()?;
                }
                Token::Real => {
                    p.predict(Production::StmtRealDecl);
                    p.match_token(Token::Real)?;
                    p.match_token(Token::Id)?;
                    p.match_token(Token::Gets)?;
                    p.expr()?;
                }
                Token::Id => {
                    p.predict(Production::StmtAssign);
                    p.match_token(Token::Id)?;
                    p.match_token(Token::Gets)?;
                    p.expr()?;
                }
                Token::Read => {
                    p.predict(Production::StmtRead);
                    p.match_token(Token::Read)?;
                    p.type_()?;
                    p.match_token(Token::Id)?;
                }
                Token::Write => {
                    p.predict(Production::StmtWrite);
                    p.match_token(Token::Write)?;
                    p.expr()?;
                }
                Token::If => {
                    p.predict(Production::StmtIf);
                    p.match_token(Token::If)?;
                    p.condition()?;
                    p.match_token(Token::Then)?;
                    p.stmt_list()?;
                    p.match_token(Token::End)?;
                }
                Token::While => {
                    p.predict(Production::StmtWhile);
                    p.match_token(Token::While)?;
                    p.condition()?;
                    p.match_token(Token::Do)?;
                    p.stmt_list()?;
                    p.match_token(Token::End)?;
                }
                _ => return Err(p.reject(NonTerminal::Stmt)),
            }
            Ok(())
        })
    }

    /// Optional type in `read`; `type` is a keyword, hence the underscore.
    pub(crate) fn type_(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::Type, |p| {
            match p.peek() {
                Token::Int => {
                    p.predict(Production::TypeInt);
                    p.match_token(Token::Int)?;
                }
                Token::Real => {
                    p.predict(Production::TypeReal);
                    p.match_token(Token::Real)?;
                }
                Token::Id => p.predict(Production::TypeEmpty),
                _ => return Err(p.reject(NonTerminal::Type)),
            }
            Ok(())
        })
    }
}
