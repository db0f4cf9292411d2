//! Diagnostics pane rendering

use crate::trace::TraceLog;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the diagnostics reported up to and including event `position`
pub fn render_diagnostics_pane(
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
        .title(" Diagnostics ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let all_items: Vec<ListItem> = trace
        .diagnostics(position + 1)
        .map(|diagnostic| {
            let color = if diagnostic.is_lexical() {
                DEFAULT_THEME.secondary
            } else {
                DEFAULT_THEME.error
            };
            ListItem::new(diagnostic.to_string()).style(Style::default().fg(color))
        })
        .collect();

    if all_items.is_empty() {
        let paragraph = Paragraph::new("(no diagnostics)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1

    // Clamp scroll offset only if content exceeds visible area
    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
