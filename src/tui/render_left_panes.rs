use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};

use super::AppModel;
use super::render_helpers::{build_list_rows, split_body_and_hint};
use super::render_sections::{border_style, hint_style};

pub(super) fn render_sessions_pane(frame: &mut Frame<'_>, model: &AppModel, area: Rect) {
    let block = Block::default()
        .title(" Sessions ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let (body, hint) = split_body_and_hint(inner);

    if model.rows.is_empty() {
        let message = if model.refreshing || model.generation == 0 {
            "Looking for allocated nodes..."
        } else {
            "No allocated nodes and no notes."
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(Color::Gray)),
            body,
        );
    } else {
        let rows = build_list_rows(model);
        let mut selected_row = None;
        let items: Vec<ListItem<'_>> = rows
            .iter()
            .enumerate()
            .map(|(line_index, row)| {
                if row.row_index == Some(model.selected) {
                    selected_row = Some(line_index);
                }
                ListItem::new(row.line.clone())
            })
            .collect();
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::Rgb(35, 60, 35))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");
        let mut list_state = ListState::default();
        list_state.select(selected_row);
        frame.render_stateful_widget(list, body, &mut list_state);
    }

    if let Some(hint_area) = hint {
        frame.render_widget(
            Paragraph::new("[j/k] move  [S] snapshots  [e] errors  [,] settings")
                .style(hint_style()),
            hint_area,
        );
    }
}
