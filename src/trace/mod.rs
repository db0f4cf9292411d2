//! Parse trace: what the parser predicted, matched, skipped and reported
//!
//! The parser talks to a [`ParseListener`]; tracing never changes what is
//! recognized. Two listeners ship with the crate:
//!
//! - [`TraceLog`] records [`TraceEvent`]s for tests and the trace viewer
//! - [`TracePrinter`] prints the classic `predict ...` / `matched ...` lines
//!   to one writer and diagnostics to another

use crate::parser::grammar::Production;
use crate::parser::lexer::{ScannedToken, SourceLocation};
use crate::parser::parse::Diagnostic;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use rustc_hash::FxHashMap;
use std::fmt;
use std::io::{self, Write};

/// Receives parser events. Every method defaults to doing nothing.
pub trait ParseListener {
    /// A production was chosen; `at` is where its first token starts.
    fn predict(&mut self, _production: Production, _at: SourceLocation) {}
    /// A terminal was consumed by `match`.
    fn matched(&mut self, _token: &ScannedToken) {}
    /// A token was discarded by panic-mode recovery.
    fn skipped(&mut self, _token: &ScannedToken) {}
    fn diagnostic(&mut self, _diagnostic: &Diagnostic) {}
}

/// The silent listener.
impl ParseListener for () {}

impl<T: ParseListener + ?Sized> ParseListener for &mut T {
    fn predict(&mut self, production: Production, at: SourceLocation) {
        (**self).predict(production, at)
    }
    fn matched(&mut self, token: &ScannedToken) {
        (**self).matched(token)
    }
    fn skipped(&mut self, token: &ScannedToken) {
        (**self).skipped(token)
    }
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        (**self).diagnostic(diagnostic)
    }
}

/// Fan-out to two listeners, left first.
impl<A: ParseListener, B: ParseListener> ParseListener for (A, B) {
    fn predict(&mut self, production: Production, at: SourceLocation) {
        self.0.predict(production, at);
        self.1.predict(production, at);
    }
    fn matched(&mut self, token: &ScannedToken) {
        self.0.matched(token);
        self.1.matched(token);
    }
    fn skipped(&mut self, token: &ScannedToken) {
        self.0.skipped(token);
        self.1.skipped(token);
    }
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.0.diagnostic(diagnostic);
        self.1.diagnostic(diagnostic);
    }
}

/// One recorded parser event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Predict {
        production: Production,
        location: SourceLocation,
    },
    Match {
        token: ScannedToken,
    },
    Skip {
        token: ScannedToken,
    },
    Diagnostic(Diagnostic),
}

impl TraceEvent {
    pub fn location(&self) -> SourceLocation {
        match self {
            TraceEvent::Predict { location, .. } => *location,
            TraceEvent::Match { token } | TraceEvent::Skip { token } => token.location,
            TraceEvent::Diagnostic(diagnostic) => diagnostic.location(),
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, TraceEvent::Diagnostic(_))
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Predict { production, .. } => write!(f, "predict {}", production),
            TraceEvent::Match { token } => write!(f, "matched {}", token),
            TraceEvent::Skip { token } => write!(f, "skipped {}", token),
            TraceEvent::Diagnostic(diagnostic) => write!(f, "{}", diagnostic),
        }
    }
}

/// Records the full event history of a parse
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    events: Vec<TraceEvent>,
    diagnostics_by_line: FxHashMap<usize, usize>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&TraceEvent> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Productions in the order they were predicted.
    pub fn productions(&self) -> impl Iterator<Item = Production> + '_ {
        self.events.iter().filter_map(|event| match event {
            TraceEvent::Predict { production, .. } => Some(*production),
            _ => None,
        })
    }

    /// Diagnostics recorded among the first `upto` events.
    pub fn diagnostics(&self, upto: usize) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.events
            .iter()
            .take(upto)
            .filter_map(|event| match event {
                TraceEvent::Diagnostic(diagnostic) => Some(diagnostic),
                _ => None,
            })
    }

    /// Number of diagnostics reported on a 1-based source line.
    pub fn diagnostics_on_line(&self, line: usize) -> usize {
        self.diagnostics_by_line.get(&line).copied().unwrap_or(0)
    }

    /// The trace rendered one event per line.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    fn push(&mut self, event: TraceEvent) {
        if let TraceEvent::Diagnostic(diagnostic) = &event {
            *self
                .diagnostics_by_line
                .entry(diagnostic.location().line)
                .or_insert(0) += 1;
        }
        self.events.push(event);
    }
}

impl ParseListener for TraceLog {
    fn predict(&mut self, production: Production, at: SourceLocation) {
        self.push(TraceEvent::Predict {
            production,
            location: at,
        });
    }

    fn matched(&mut self, token: &ScannedToken) {
        self.push(TraceEvent::Match {
            token: token.clone(),
        });
    }

    fn skipped(&mut self, token: &ScannedToken) {
        self.push(TraceEvent::Skip {
            token: token.clone(),
        });
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.push(TraceEvent::Diagnostic(diagnostic.clone()));
    }
}

/// Prints the trace to `out` and diagnostics to `err`.
///
/// Write failures are remembered and returned by [`finish`](TracePrinter::finish);
/// listener callbacks cannot fail.
pub struct TracePrinter<W: Write, E: Write> {
    out: W,
    err: E,
    show_trace: bool,
    color: bool,
    error: Option<io::Error>,
}

impl TracePrinter<io::Stdout, io::Stderr> {
    /// Trace on stdout, diagnostics on stderr, colored when stderr is a terminal.
    pub fn stdio(show_trace: bool) -> Self {
        let color = io::stderr().is_tty();
        Self::new(io::stdout(), io::stderr(), show_trace, color)
    }
}

impl<W: Write, E: Write> TracePrinter<W, E> {
    pub fn new(out: W, err: E, show_trace: bool, color: bool) -> Self {
        Self {
            out,
            err,
            show_trace,
            color,
            error: None,
        }
    }

    /// Flush both writers and hand them back.
    pub fn finish(mut self) -> io::Result<(W, E)> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        self.err.flush()?;
        Ok((self.out, self.err))
    }

    fn trace_line(&mut self, line: fmt::Arguments<'_>) {
        if !self.show_trace || self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{}", line) {
            self.error = Some(err);
        }
    }
}

impl<W: Write, E: Write> ParseListener for TracePrinter<W, E> {
    fn predict(&mut self, production: Production, _at: SourceLocation) {
        self.trace_line(format_args!("predict {}", production));
    }

    fn matched(&mut self, token: &ScannedToken) {
        self.trace_line(format_args!("matched {}", token));
    }

    fn skipped(&mut self, token: &ScannedToken) {
        self.trace_line(format_args!("skipped {}", token));
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        if self.error.is_some() {
            return;
        }
        let message = diagnostic.to_string();
        let result = match (self.color, diagnostic.is_lexical()) {
            (false, _) => writeln!(self.err, "{}", message),
            (true, true) => writeln!(self.err, "{}", message.yellow()),
            (true, false) => writeln!(self.err, "{}", message.red().bold()),
        };
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}
