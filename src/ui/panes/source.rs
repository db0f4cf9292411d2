//! Source code pane rendering with syntax highlighting
//!
//! This module renders the program being traced with keyword highlighting and
//! position indicators.
//!
//! # Features
//!
//! - Highlighting for calculator keywords, type names, conversions and numbers
//! - Current line highlighting, with the column of the current event marked
//! - A `!` gutter marker on every line that produced a diagnostic
//! - Scroll state that keeps the current line at a fixed visual row
//!
//! # Rendering
//!
//! The pane uses a simple character-by-character splitter and
//! [`Token::keyword`] to classify words, rather than running the lexer on each
//! visible line.

use crate::parser::lexer::{SourceLocation, Token};
use crate::trace::TraceLog;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Simple syntax highlighting for one line of calculator source
fn highlight_source_code(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    for c in line.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || (c == '.' && starts_number(&current_word)) {
            current_word.push(c);
            continue;
        }
        if !current_word.is_empty() {
            let style = get_word_style(&current_word);
            spans.push(Span::styled(std::mem::take(&mut current_word), style));
        }

        let style = match c {
            '(' | ')' => Style::default().fg(DEFAULT_THEME.primary),
            ';' => Style::default().fg(DEFAULT_THEME.comment),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        spans.push(Span::styled(c.to_string(), style));
    }

    if !current_word.is_empty() {
        let style = get_word_style(&current_word);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn starts_number(word: &str) -> bool {
    word.bytes().next().is_some_and(|b| b.is_ascii_digit())
}

fn get_word_style(word: &str) -> Style {
    match Token::keyword(word) {
        Some(Token::Int | Token::Real) => Style::default().fg(DEFAULT_THEME.type_name),
        Some(Token::Trunc | Token::Float) => Style::default().fg(DEFAULT_THEME.function),
        Some(_) => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        None if starts_number(word) => Style::default().fg(DEFAULT_THEME.number),
        None => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Split out the character at 1-based `column` and give it `mark` on top of its style.
///
/// A column just past the end of the line (where `eof` or a newline sits) is
/// shown as a marked blank.
fn mark_column(line: Line<'static>, column: usize, mark: Style) -> Line<'static> {
    let target = column.saturating_sub(1);
    let mut spans = Vec::with_capacity(line.spans.len() + 2);
    let mut start = 0;
    let mut marked = false;

    for span in line.spans {
        let chars: Vec<char> = span.content.chars().collect();
        let end = start + chars.len();
        if !marked && (start..end).contains(&target) {
            let offset = target - start;
            let before: String = chars[..offset].iter().collect();
            let after: String = chars[offset + 1..].iter().collect();
            if !before.is_empty() {
                spans.push(Span::styled(before, span.style));
            }
            spans.push(Span::styled(chars[offset].to_string(), span.style.patch(mark)));
            if !after.is_empty() {
                spans.push(Span::styled(after, span.style));
            }
            marked = true;
        } else {
            spans.push(span);
        }
        start = end;
    }

    if !marked {
        spans.push(Span::styled(" ", mark));
    }
    Line::from(spans)
}

/// Scroll state for the source pane
pub struct SourceScrollState {
    pub offset: usize,
    pub target_line_row: Option<usize>,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current: Option<SourceLocation>,
    trace: &TraceLog,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let current_line = current.map_or(0, |loc| loc.line);

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1

    // Keep the current line at the target visual row, centered at first
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if current_line > 0 && current_line <= total_lines {
        scroll_state.offset = (current_line - 1).saturating_sub(target_row);

        if total_lines > visible_height {
            let max_scroll = total_lines - visible_height;
            scroll_state.offset = scroll_state.offset.min(max_scroll);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;
            let has_diagnostic = trace.diagnostics_on_line(line_num) > 0;

            let gutter = if has_diagnostic {
                Span::styled(
                    "!",
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(" ")
            };

            let num_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut content_line = highlight_source_code(line);

            if let Some(location) = current.filter(|_| is_current) {
                let background = Style::default().bg(DEFAULT_THEME.current_line_bg);
                for span in &mut content_line.spans {
                    span.style = span.style.patch(background);
                }
                content_line = mark_column(
                    content_line,
                    location.column,
                    Style::default().add_modifier(Modifier::REVERSED),
                );
            }

            let mut final_spans = vec![gutter, Span::styled(format!("{:4} ", line_num), num_style)];
            final_spans.extend(content_line.spans);

            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_splits_words_and_numbers() {
        let line = highlight_source_code("real y := 2.5e3;");
        assert_eq!(text(&line), vec!["real", " ", "y", " ", ":", "=", " ", "2.5e3", ";"]);
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.type_name));
        assert_eq!(line.spans[7].style.fg, Some(DEFAULT_THEME.number));
    }

    #[test]
    fn test_mark_column_splits_span() {
        let mark = Style::default().add_modifier(Modifier::REVERSED);
        let line = mark_column(highlight_source_code("while n"), 3, mark);
        assert_eq!(text(&line), vec!["wh", "i", "le", " ", "n"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_mark_column_past_end() {
        let mark = Style::default().add_modifier(Modifier::REVERSED);
        let line = mark_column(highlight_source_code("x;"), 3, mark);
        assert_eq!(text(&line), vec!["x", ";", " "]);
    }
}
