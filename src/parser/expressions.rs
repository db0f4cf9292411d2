//! Expression recognition
//!
//! Arithmetic expressions are written in the classic left-factored form, so
//! each level is a head followed by a possibly empty tail:
//!
//! ```text
//! condition   ::= expr ro expr
//! expr        ::= term term_tail
//! term_tail   ::= add_op term term_tail | ε
//! term        ::= factor factor_tail
//! factor_tail ::= mul_op factor factor_tail | ε
//! factor      ::= i_num | r_num | id | '(' expr ')'
//!               | 'trunc' '(' expr ')' | 'float' '(' expr ')'
//! ```
//!
//! The tails pick their ε-production when the lookahead is in their FOLLOW
//! set; anything else is rejected and recovered from. Both tails are driven
//! by [`Parser::repeat`], one operator per round, so a long sum or product
//! costs no extra stack.

use crate::parser::grammar::{NonTerminal, Production};
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};
use crate::trace::ParseListener;

impl<I: Iterator<Item = u8>, L: ParseListener> Parser<I, L> {
    pub(crate) fn condition(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::Condition, |p| {
            match p.peek() {
                Token::LParen
                | Token::Id
                | Token::INum
                | Token::RNum
                | Token::Trunc
                | Token::Float => {
                    p.predict(Production::Condition);
                    p.expr()?;
                    p.ro()?;
                    p.expr()?;
                }
                _ => return Err(p.reject(NonTerminal::Condition)),
            }
            Ok(())
        })
    }

    pub(crate) fn expr(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::Expr, |p| {
            match p.peek() {
                Token::LParen
                | Token::Id
                | Token::INum
                | Token::RNum
                | Token::Trunc
                | Token::Float => {
                    p.predict(Production::Expr);
                    p.term()?;
                    p.term_tail()?;
                }
                _ => return Err(p.reject(NonTerminal::Expr)),
            }
            Ok(())
        })
    }

    pub(crate) fn term_tail(&mut self) -> Result<(), ParseError> {
        self.repeat(NonTerminal::TermTail, |p| {
            match p.peek() {
                Token::Add | Token::Sub => {
                    p.predict(Production::TermTailAdd);
                    p.add_op()?;
                    p.term()?;
                }
                Token::RParen
                | Token::Semicolon
                | Token::Then
                | Token::Do
                | Token::Equal
                | Token::NotEqual
                | Token::Less
                | Token::Greater
                | Token::LessOrEqual
                | Token::GreaterOrEqual => {
                    p.predict(Production::TermTailEmpty);
                    return Ok(false);
                }
                _ => return Err(p.reject(NonTerminal::TermTail)),
            }
            Ok(true)
        })
    }

    pub(crate) fn term(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::Term, |p| {
            match p.peek() {
                Token::LParen
                | Token::Id
                | Token::INum
                | Token::RNum
                | Token::Trunc
                | Token::Float => {
                    p.predict(Production::Term);
                    p.factor()?;
                    p.factor_tail()?;
                }
                _ => return Err(p.reject(NonTerminal::Term)),
            }
            Ok(())
        })
    }

    pub(crate) fn factor_tail(&mut self) -> Result<(), ParseError> {
        self.repeat(NonTerminal::FactorTail, |p| {
            match p.peek() {
                Token::Mul | Token::Div => {
                    p.predict(Production::FactorTailMul);
                    p.mul_op()?;
                    p.factor()?;
                }
                Token::Add
                | Token::Sub
                | Token::RParen
                | Token::Semicolon
                | Token::Then
                | Token::Do
                | Token::Equal
                | Token::NotEqual
                | Token::Less
                | Token::Greater
                | Token::LessOrEqual
                | Token::GreaterOrEqual => {
                    p.predict(Production::FactorTailEmpty);
                    return Ok(false);
                }
                _ => return Err(p.reject(NonTerminal::FactorTail)),
            }
            Ok(true)
        })
    }

    pub(crate) fn factor(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::Factor, |p| {
            match p.peek() {
                Token::INum => {
                    p.predict(Production::FactorINum);
                    p.match_token(Token::INum)?;
                }
                Token::RNum => {
                    p.predict(Production::FactorRNum);
                    p.match_token(Token::RNum)?;
                }
                Token::Id => {
                    p.predict(Production::FactorId);
                    p.match_token(Token::Id)?;
                }
                Token::LParen => {
                    p.predict(Production::FactorParen);
                    p.match_token(Token::LParen)?;
                    p.expr()?;
                    p.match_token(Token::RParen)?;
                }
                Token::Trunc => {
                    p.predict(Production::FactorTrunc);
                    p.match_token(Token::Trunc)?;
                    p.match_token(Token::LParen)?;
                    p.expr()?;
                    p.match_token(Token::RParen)?;
                }
                Token::Float => {
                    p.predict(Production::FactorFloat);
                    p.match_token(Token::Float)?;
                    p.match_token(Token::LParen)?;
                    p.expr()?;
                    p.match_token(Token::RParen)?;
                }
                _ => return Err(p.reject(NonTerminal::Factor)),
            }
            Ok(())
        })
    }

    pub(crate) fn ro(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::Ro, |p| {
            let production = match p.peek() {
                Token::Equal => Production::RoEqual,
                Token::NotEqual => Production::RoNotEqual,
                Token::Less => Production::RoLess,
                Token::Greater => Production::RoGreater,
                Token::LessOrEqual => Production::RoLessOrEqual,
                Token::GreaterOrEqual => Production::RoGreaterOrEqual,
                _ => return Err(p.reject(NonTerminal::Ro)),
            };
            p.predict(production);
            p.match_token(p.peek())
        })
    }

    pub(crate) fn add_op(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::AddOp, |p| {
            let production = match p.peek() {
                Token::Add => Production::AddOpAdd,
                Token::Sub => Production::AddOpSub,
                _ => return Err(p.reject(NonTerminal::AddOp)),
            };
            p.predict(production);
            p.match_token(p.peek())
        })
    }

    pub(crate) fn mul_op(&mut self) -> Result<(), ParseError> {
        self.nonterminal(NonTerminal::MulOp, |p| {
            let production = match p.peek() {
                Token::Mul => Production::MulOpMul,
                Token::Div => Production::MulOpDiv,
                _ => return Err(p.reject(NonTerminal::MulOp)),
            };
            p.predict(production);
            p.match_token(p.peek())
        })
    }
}
