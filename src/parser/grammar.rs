//! Grammar data for the calculator language
//!
//! ```text
//! Program    -> StmtList eof
//! StmtList   -> Stmt ; StmtList | ε
//! Stmt       -> int id := Expr | real id := Expr | id := Expr
//!             | read Type id | write Expr
//!             | if Condition then StmtList end
//!             | while Condition do StmtList end
//! Type       -> int | real | ε
//! Condition  -> Expr Ro Expr
//! Expr       -> Term TermTail
//! TermTail   -> AddOp Term TermTail | ε
//! Term       -> Factor FactorTail
//! FactorTail -> MulOp Factor FactorTail | ε
//! Factor     -> i_num | r_num | id | ( Expr ) | trunc ( Expr ) | float ( Expr )
//! Ro         -> = | <> | < | > | <= | >=
//! AddOp      -> + | -
//! MulOp      -> * | /
//! ```
//!
//! The FIRST and FOLLOW sets below are derived by hand and stored as
//! [`TokenSet`] constants; nothing is computed at run time.

use super::lexer::Token;
use std::fmt;

/// A set of token kinds, one bit per [`Token`] discriminant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet(u32);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub const fn of(tokens: &[Token]) -> Self {
        let mut bits = 0u32;
        let mut i = 0;
        while i < tokens.len() {
            bits |= 1u32 << (tokens[i] as u32);
            i += 1;
        }
        TokenSet(bits)
    }

    pub const fn union(self, other: TokenSet) -> Self {
        TokenSet(self.0 | other.0)
    }

    pub const fn with(self, token: Token) -> Self {
        TokenSet(self.0 | (1u32 << (token as u32)))
    }

    pub const fn contains(self, token: Token) -> bool {
        self.0 & (1u32 << (token as u32)) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_disjoint(self, other: TokenSet) -> bool {
        self.0 & other.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Token> {
        Token::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Token::name)).finish()
    }
}

use Token::*;

const FIRST_STMT: TokenSet = TokenSet::of(&[Int, Real, Id, Read, Write, If, While]);
const FIRST_TYPE: TokenSet = TokenSet::of(&[Int, Real]);
const FIRST_FACTOR: TokenSet = TokenSet::of(&[INum, RNum, Id, LParen, Trunc, Float]);
const FIRST_RO: TokenSet =
    TokenSet::of(&[Equal, NotEqual, Less, Greater, LessOrEqual, GreaterOrEqual]);
const FIRST_ADD_OP: TokenSet = TokenSet::of(&[Add, Sub]);
const FIRST_MUL_OP: TokenSet = TokenSet::of(&[Mul, Div]);

const FOLLOW_PROGRAM: TokenSet = TokenSet::of(&[Eof]);
const FOLLOW_STMT_LIST: TokenSet = TokenSet::of(&[End, Eof]);
const FOLLOW_STMT: TokenSet = TokenSet::of(&[Semicolon]);
const FOLLOW_TYPE: TokenSet = TokenSet::of(&[Id]);
const FOLLOW_CONDITION: TokenSet = TokenSet::of(&[Then, Do]);
const FOLLOW_EXPR: TokenSet = FOLLOW_STMT
    .union(FIRST_RO)
    .union(FOLLOW_CONDITION)
    .with(RParen);
const FOLLOW_TERM: TokenSet = FIRST_ADD_OP.union(FOLLOW_EXPR);
const FOLLOW_FACTOR: TokenSet = FIRST_MUL_OP.union(FOLLOW_TERM);

/// Grammar nonterminals, one recognition procedure each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerminal {
    Program,
    StmtList,
    Stmt,
    Type,
    Condition,
    Expr,
    TermTail,
    Term,
    FactorTail,
    Factor,
    Ro,
    AddOp,
    MulOp,
}

impl NonTerminal {
    pub const ALL: [NonTerminal; 13] = [
        NonTerminal::Program,
        NonTerminal::StmtList,
        NonTerminal::Stmt,
        NonTerminal::Type,
        NonTerminal::Condition,
        NonTerminal::Expr,
        NonTerminal::TermTail,
        NonTerminal::Term,
        NonTerminal::FactorTail,
        NonTerminal::Factor,
        NonTerminal::Ro,
        NonTerminal::AddOp,
        NonTerminal::MulOp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NonTerminal::Program => "program",
            NonTerminal::StmtList => "stmt_list",
            NonTerminal::Stmt => "stmt",
            NonTerminal::Type => "type",
            NonTerminal::Condition => "condition",
            NonTerminal::Expr => "expr",
            NonTerminal::TermTail => "term_tail",
            NonTerminal::Term => "term",
            NonTerminal::FactorTail => "factor_tail",
            NonTerminal::Factor => "factor",
            NonTerminal::Ro => "ro",
            NonTerminal::AddOp => "add_op",
            NonTerminal::MulOp => "mul_op",
        }
    }

    /// FIRST set, without ε.
    pub fn first(self) -> TokenSet {
        match self {
            // eof is in FIRST(Program) because StmtList is nullable
            NonTerminal::Program => FIRST_STMT.with(Eof),
            NonTerminal::StmtList | NonTerminal::Stmt => FIRST_STMT,
            NonTerminal::Type => FIRST_TYPE,
            NonTerminal::Condition
            | NonTerminal::Expr
            | NonTerminal::Term
            | NonTerminal::Factor => FIRST_FACTOR,
            NonTerminal::TermTail | NonTerminal::AddOp => FIRST_ADD_OP,
            NonTerminal::FactorTail | NonTerminal::MulOp => FIRST_MUL_OP,
            NonTerminal::Ro => FIRST_RO,
        }
    }

    pub fn follow(self) -> TokenSet {
        match self {
            NonTerminal::Program => FOLLOW_PROGRAM,
            NonTerminal::StmtList => FOLLOW_STMT_LIST,
            NonTerminal::Stmt => FOLLOW_STMT,
            NonTerminal::Type => FOLLOW_TYPE,
            NonTerminal::Condition => FOLLOW_CONDITION,
            NonTerminal::Expr | NonTerminal::TermTail => FOLLOW_EXPR,
            NonTerminal::Term | NonTerminal::FactorTail => FOLLOW_TERM,
            NonTerminal::Factor => FOLLOW_FACTOR,
            NonTerminal::Ro | NonTerminal::AddOp | NonTerminal::MulOp => FIRST_FACTOR,
        }
    }

    pub fn is_nullable(self) -> bool {
        matches!(
            self,
            NonTerminal::StmtList
                | NonTerminal::Type
                | NonTerminal::TermTail
                | NonTerminal::FactorTail
        )
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A grammar symbol on the right-hand side of a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    T(Token),
    N(NonTerminal),
}

/// Every alternative of every nonterminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    Program,
    StmtListStmt,
    StmtListEmpty,
    StmtIntDecl,
    StmtRealDecl,
    StmtAssign,
    StmtRead,
    StmtWrite,
    StmtIf,
    StmtWhile,
    TypeInt,
    TypeReal,
    TypeEmpty,
    Condition,
    Expr,
    TermTailAdd,
    TermTailEmpty,
    Term,
    FactorTailMul,
    FactorTailEmpty,
    FactorINum,
    FactorRNum,
    FactorId,
    FactorParen,
    FactorTrunc,
    FactorFloat,
    RoEqual,
    RoNotEqual,
    RoLess,
    RoGreater,
    RoLessOrEqual,
    RoGreaterOrEqual,
    AddOpAdd,
    AddOpSub,
    MulOpMul,
    MulOpDiv,
}

impl Production {
    pub const ALL: [Production; 36] = [
        Production::Program,
        Production::StmtListStmt,
        Production::StmtListEmpty,
        Production::StmtIntDecl,
        Production::StmtRealDecl,
        Production::StmtAssign,
        Production::StmtRead,
        Production::StmtWrite,
        Production::StmtIf,
        Production::StmtWhile,
        Production::TypeInt,
        Production::TypeReal,
        Production::TypeEmpty,
        Production::Condition,
        Production::Expr,
        Production::TermTailAdd,
        Production::TermTailEmpty,
        Production::Term,
        Production::FactorTailMul,
        Production::FactorTailEmpty,
        Production::FactorINum,
        Production::FactorRNum,
        Production::FactorId,
        Production::FactorParen,
        Production::FactorTrunc,
        Production::FactorFloat,
        Production::RoEqual,
        Production::RoNotEqual,
        Production::RoLess,
        Production::RoGreater,
        Production::RoLessOrEqual,
        Production::RoGreaterOrEqual,
        Production::AddOpAdd,
        Production::AddOpSub,
        Production::MulOpMul,
        Production::MulOpDiv,
    ];

    /// The nonterminal this production rewrites.
    pub fn lhs(self) -> NonTerminal {
        use Production as P;
        match self {
            P::Program => NonTerminal::Program,
            P::StmtListStmt | P::StmtListEmpty => NonTerminal::StmtList,
            P::StmtIntDecl
            | P::StmtRealDecl
            | P::StmtAssign
            | P::StmtRead
            | P::StmtWrite
            | P::StmtIf
            | P::StmtWhile => NonTerminal::Stmt,
            P::TypeInt | P::TypeReal | P::TypeEmpty => NonTerminal::Type,
            P::Condition => NonTerminal::Condition,
            P::Expr => NonTerminal::Expr,
            P::TermTailAdd | P::TermTailEmpty => NonTerminal::TermTail,
            P::Term => NonTerminal::Term,
            P::FactorTailMul | P::FactorTailEmpty => NonTerminal::FactorTail,
            P::FactorINum
            | P::FactorRNum
            | P::FactorId
            | P::FactorParen
            | P::FactorTrunc
            | P::FactorFloat => NonTerminal::Factor,
            P::RoEqual
            | P::RoNotEqual
            | P::RoLess
            | P::RoGreater
            | P::RoLessOrEqual
            | P::RoGreaterOrEqual => NonTerminal::Ro,
            P::AddOpAdd | P::AddOpSub => NonTerminal::AddOp,
            P::MulOpMul | P::MulOpDiv => NonTerminal::MulOp,
        }
    }

    /// Right-hand side; empty for ε-productions.
    pub fn rhs(self) -> &'static [Symbol] {
        use NonTerminal as N;
        use Production as P;
        use Symbol::{N as Nt, T};
        match self {
            P::Program => &[Nt(N::StmtList), T(Eof)],
            P::StmtListStmt => &[Nt(N::Stmt), T(Semicolon), Nt(N::StmtList)],
            P::StmtIntDecl => &[T(Int), T(Id), T(Gets), Nt(N::Expr)],
            P::StmtRealDecl => &[T(Real), T(Id), T(Gets), Nt(N::Expr)],
            P::StmtAssign => &[T(Id), T(Gets), Nt(N::Expr)],
            P::StmtRead => &[T(Read), Nt(N::Type), T(Id)],
            P::StmtWrite => &[T(Write), Nt(N::Expr)],
            P::StmtIf => &[T(If), Nt(N::Condition), T(Then), Nt(N::StmtList), T(End)],
            P::StmtWhile => &[T(While), Nt(N::Condition), T(Do), Nt(N::StmtList), T(End)],
            P::TypeInt => &[T(Int)],
            P::TypeReal => &[T(Real)],
            P::Condition => &[Nt(N::Expr), Nt(N::Ro), Nt(N::Expr)],
            P::Expr => &[Nt(N::Term), Nt(N::TermTail)],
            P::TermTailAdd => &[Nt(N::AddOp), Nt(N::Term), Nt(N::TermTail)],
            P::Term => &[Nt(N::Factor), Nt(N::FactorTail)],
            P::FactorTailMul => &[Nt(N::MulOp), Nt(N::Factor), Nt(N::FactorTail)],
            P::FactorINum => &[T(INum)],
            P::FactorRNum => &[T(RNum)],
            P::FactorId => &[T(Id)],
            P::FactorParen => &[T(LParen), Nt(N::Expr), T(RParen)],
            P::FactorTrunc => &[T(Trunc), T(LParen), Nt(N::Expr), T(RParen)],
            P::FactorFloat => &[T(Float), T(LParen), Nt(N::Expr), T(RParen)],
            P::RoEqual => &[T(Equal)],
            P::RoNotEqual => &[T(NotEqual)],
            P::RoLess => &[T(Less)],
            P::RoGreater => &[T(Greater)],
            P::RoLessOrEqual => &[T(LessOrEqual)],
            P::RoGreaterOrEqual => &[T(GreaterOrEqual)],
            P::AddOpAdd => &[T(Add)],
            P::AddOpSub => &[T(Sub)],
            P::MulOpMul => &[T(Mul)],
            P::MulOpDiv => &[T(Div)],
            P::StmtListEmpty | P::TypeEmpty | P::TermTailEmpty | P::FactorTailEmpty => &[],
        }
    }
}

impl fmt::Display for Production {
    /// Renders as `stmt --> int id := expr`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -->", self.lhs())?;
        let rhs = self.rhs();
        if rhs.is_empty() {
            return write!(f, " epsilon");
        }
        for symbol in rhs {
            match symbol {
                Symbol::T(token) => write!(f, " {}", token)?,
                Symbol::N(nt) => write!(f, " {}", nt)?,
            }
        }
        Ok(())
    }
}
