use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::AppModel;

pub(super) use super::render_text_utils::{
    centered_rect, format_clock, format_duration_short, format_relative_age, truncate_chars,
    watch_label, watch_style,
};

pub(super) struct ListRow {
    pub(super) line: Line<'static>,
    pub(super) row_index: Option<usize>,
}

#[derive(Default)]
struct ColumnWidths {
    session: usize,
    windows: usize,
}

/// Session rows grouped under one header line per node.
pub(super) fn build_list_rows(model: &AppModel) -> Vec<ListRow> {
    let mut rows = Vec::new();
    let mut widths = ColumnWidths::default();
    for row in &model.rows {
        widths.session = widths.session.max(row.key.session.chars().count());
        widths.windows = widths.windows.max(windows_label(row.window_count).len());
    }

    let mut current_node: Option<(&str, bool)> = None;
    for (index, row) in model.rows.iter().enumerate() {
        let group = (row.key.node.as_str(), row.is_stale);
        if current_node != Some(group) {
            current_node = Some(group);
            let mut header = vec![Span::styled(
                format!("{} ", row.key.node),
                Style::default()
                    .fg(if row.is_stale {
                        Color::DarkGray
                    } else {
                        Color::Yellow
                    })
                    .add_modifier(Modifier::BOLD),
            )];
            if row.is_stale {
                header.push(Span::styled(
                    "(offline)",
                    Style::default().fg(Color::DarkGray),
                ));
            } else if let Some(time_left) = &row.time_left {
                header.push(Span::styled(
                    format!("[{time_left} left]"),
                    Style::default().fg(Color::Gray),
                ));
            }
            rows.push(ListRow {
                line: Line::from(header),
                row_index: None,
            });
        }

        let base_style = if row.is_stale {
            Style::default().fg(Color::DarkGray)
        } else if row.is_placeholder {
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default().fg(Color::Green)
        };
        let windows = if row.is_stale || row.is_placeholder {
            String::new()
        } else {
            windows_label(row.window_count)
        };
        let mut spans = vec![
            Span::styled(
                format!(
                    "  {:<session_width$}  ",
                    row.key.session,
                    session_width = widths.session
                ),
                base_style,
            ),
            Span::styled(
                format!("{:<windows_width$}", windows, windows_width = widths.windows),
                Style::default().fg(Color::Gray),
            ),
        ];
        if let Some(badge) = &row.watch {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(watch_label(badge), watch_style(badge.state)));
        }
        if let Some(note) = &row.note {
            spans.push(Span::styled(
                format!("  # {}", truncate_chars(note, 40)),
                Style::default().fg(Color::LightCyan),
            ));
        }
        rows.push(ListRow {
            line: Line::from(spans),
            row_index: Some(index),
        });
    }
    rows
}

fn windows_label(count: u32) -> String {
    format!("{count}w")
}

pub(super) fn split_body_and_hint(area: Rect) -> (Rect, Option<Rect>) {
    if area.height <= 1 {
        (area, None)
    } else {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        (sections[0], Some(sections[1]))
    }
}
