//! # Introduction
//!
//! calcparse recognizes programs in a small calculator language with a
//! hand-written predictive recursive-descent parser. It reports every lexical
//! and syntax error it meets, resynchronizes with panic-mode recovery, and
//! keeps going until the end of the input.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → ParseListener (trace printer, trace log → TUI)
//! ```
//!
//! 1. [`parser`]: scanning, the grammar tables (FIRST/FOLLOW sets) and the
//!    recognizer itself.
//! 2. [`trace`]: the [`trace::ParseListener`] hook and the listeners that
//!    print or record what the parser predicted, matched and skipped.
//! 3. [`ui`]: ratatui viewer that steps through a recorded trace; not part of
//!    the stable library API.
//!
//! ## Example
//!
//! ```
//! let outcome = calcparse::parser::recognize("int x := 1 + 2 * 3; write x;");
//! assert!(outcome.is_accepted());
//!
//! let outcome = calcparse::parser::recognize("x := ;");
//! assert_eq!(outcome.syntax_errors(), 1);
//! ```

pub mod parser;
pub mod trace;
pub mod ui;
