//! Main TUI application state and logic

use crate::trace::{TraceEvent, TraceLog};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::io;
use std::time::{Duration, Instant};

use super::panes::SourceScrollState;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Trace,
    Diagnostics,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> diagnostics -> trace)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Diagnostics,
            FocusedPane::Diagnostics => FocusedPane::Trace,
            FocusedPane::Trace => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The program that was parsed
    pub source_code: String,

    /// Everything the parser reported, in order
    pub trace: TraceLog,

    /// Index of the current event in `trace`
    pub position: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    pub source_scroll: SourceScrollState,
    pub trace_scroll: usize,
    pub diagnostics_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(source_code: String, trace: TraceLog) -> Self {
        let space_ready = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);
        App {
            source_code,
            trace,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState {
                offset: 0,
                target_line_row: None,
            },
            trace_scroll: usize::MAX,
            diagnostics_scroll: usize::MAX,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: space_ready,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(500) {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn current_event(&self) -> Option<&TraceEvent> {
        self.trace.get(self.position)
    }

    pub fn is_at_end(&self) -> bool {
        self.position + 1 >= self.trace.len()
    }

    /// Advance one event. Returns false at the end of the trace.
    pub fn step_forward(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.position += 1;
        self.follow_output();
        true
    }

    /// Go back one event. Returns false at the start of the trace.
    pub fn step_backward(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.follow_output();
        true
    }

    /// Step forward up to `n` events, returning how many were taken.
    pub fn step_forward_by(&mut self, n: usize) -> usize {
        (0..n).take_while(|_| self.step_forward()).count()
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.trace.len().saturating_sub(1);
        self.follow_output();
    }

    pub fn jump_to_start(&mut self) {
        self.position = 0;
        self.follow_output();
    }

    /// Diagnostics reached so far, the current event included.
    pub fn diagnostics_so_far(&self) -> usize {
        self.trace.diagnostics(self.position + 1).count()
    }

    // Trace and diagnostics panes stick to their newest entry while stepping.
    fn follow_output(&mut self) {
        self.trace_scroll = usize::MAX;
        self.diagnostics_scroll = usize::MAX;
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(pane_area);

        // Left column: Source (top) | Diagnostics (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        let current = self.current_event().map(TraceEvent::location);

        super::panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            current,
            &self.trace,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_diagnostics_pane(
            frame,
            left_rows[1],
            &self.trace,
            self.position,
            self.focused_pane == FocusedPane::Diagnostics,
            &mut self.diagnostics_scroll,
        );

        super::panes::render_trace_pane(
            frame,
            columns[1],
            &self.trace,
            self.position,
            self.focused_pane == FocusedPane::Trace,
            &mut self.trace_scroll,
        );

        super::panes::render_status_bar(
            frame,
            status_area,
            &self.status_message,
            self.position,
            self.trace.len(),
            self.diagnostics_so_far(),
            self.is_playing,
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let stepped = self.step_forward_by(usize::from(c as u8 - b'0'));
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.step_backward() {
                    "Stepped backward".to_string()
                } else {
                    "Cannot step backward: at start of trace".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Cannot step forward: at end of trace".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Trace => {
                    self.trace_scroll = self.trace_scroll.saturating_sub(1);
                }
                FocusedPane::Diagnostics => {
                    self.diagnostics_scroll = self.diagnostics_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Trace => {
                    self.trace_scroll = self.trace_scroll.saturating_add(1);
                }
                FocusedPane::Diagnostics => {
                    self.diagnostics_scroll = self.diagnostics_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now();
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.jump_to_end();
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.jump_to_start();
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::recognize_with;
    use crossterm::event::KeyModifiers;

    fn app(source: &str) -> App {
        let (_, trace) = recognize_with(source, TraceLog::new());
        App::new(source.to_string(), trace)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_stepping_stays_within_trace() {
        let mut app = app("write 1;");
        assert!(!app.step_backward());
        assert!(app.step_forward());
        assert_eq!(app.position, 1);

        app.jump_to_end();
        assert!(app.is_at_end());
        assert!(!app.step_forward());
        assert_eq!(app.position, app.trace.len() - 1);

        app.jump_to_start();
        assert_eq!(app.position, 0);
    }

    #[test]
    fn test_digit_keys_step_forward() {
        let mut app = app("x := 1 + 2;");
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.position, 3);
        assert_eq!(app.status_message, "Stepped forward 3 step(s)");

        press(&mut app, KeyCode::Left);
        assert_eq!(app.position, 2);
        press(&mut app, KeyCode::Enter);
        assert!(app.is_at_end());
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.position, 0);
    }

    #[test]
    fn test_diagnostics_counted_up_to_cursor() {
        let mut app = app("write ;");
        assert_eq!(app.diagnostics_so_far(), 0);
        app.jump_to_end();
        assert_eq!(app.diagnostics_so_far(), 1);
    }

    #[test]
    fn test_tab_cycles_focus_and_q_quits() {
        let mut app = app("");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Diagnostics);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Source);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
