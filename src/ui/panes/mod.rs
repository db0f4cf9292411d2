//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code with keyword highlighting, the current line and
//!   column, and lines that produced diagnostics
//! - [`trace`]: Parser events from the start of the trace up to the cursor
//! - [`diagnostics`]: Lexical and syntax errors reached so far
//! - [`status`]: Status bar with keybindings and step counter
//!
//! Each pane module exports a `render_*` function taking the frame, its area,
//! the data to show and its scroll state.

pub mod diagnostics;
pub mod source;
pub mod status;
pub mod trace;

// Re-export render functions for convenience
pub use diagnostics::render_diagnostics_pane;
pub use source::{render_source_pane, SourceScrollState};
pub use status::render_status_bar;
pub use trace::render_trace_pane;
