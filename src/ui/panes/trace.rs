//! Trace pane rendering: parser events up to the cursor

use crate::trace::{TraceEvent, TraceLog};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding},
    Frame,
};

fn event_style(event: &TraceEvent) -> Style {
    match event {
        TraceEvent::Predict { .. } => Style::default().fg(DEFAULT_THEME.fg),
        TraceEvent::Match { .. } => Style::default().fg(DEFAULT_THEME.success),
        TraceEvent::Skip { .. } => Style::default().fg(DEFAULT_THEME.secondary),
        TraceEvent::Diagnostic(_) => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD),
    }
}

/// Render the trace pane
pub fn render_trace_pane(
    frame: &mut Frame,
    area: Rect,
    trace: &TraceLog,
    position: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Parse Trace ")
        .borders(Borders::ALL)
        .border_style(border_style)
        .padding(Padding::new(1, 0, 0, 0));

    let shown = trace.events().iter().take(position + 1);
    let total_items = shown.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let items: Vec<ListItem> = shown
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, event)| {
            let mut style = event_style(event);
            if idx == position {
                style = style.bg(DEFAULT_THEME.current_line_bg);
            }
            ListItem::new(format!("{:>5}  {}", idx + 1, event)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
