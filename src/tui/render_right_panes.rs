use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::tmux::SHELL_PLACEHOLDER_LINE;

use super::AppModel;
use super::render_helpers::{format_duration_short, watch_label, watch_style};
use super::render_sections::border_style;

pub(super) fn render_details_pane(frame: &mut Frame<'_>, model: &AppModel, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(row) = model.selected_row() else {
        frame.render_widget(Paragraph::new("nothing selected"), inner);
        return;
    };
    let label = Style::default().fg(Color::Gray);
    let status = if row.is_placeholder {
        Span::styled("no tmux session", Style::default().fg(Color::Gray))
    } else if row.is_stale {
        Span::styled("offline", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            format!("live, {} window(s)", row.window_count),
            Style::default().fg(Color::Green),
        )
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("session  ", label),
            Span::styled(
                row.key.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![Span::styled("status   ", label), status]),
        Line::from(vec![
            Span::styled("time     ", label),
            Span::raw(row.time_left.clone().unwrap_or_else(|| "-".to_string())),
        ]),
    ];
    let watch = match &row.watch {
        Some(badge) => Span::styled(
            format!(
                "{} (alert after {})",
                watch_label(badge),
                format_duration_short(badge.threshold_secs)
            ),
            watch_style(badge.state),
        ),
        None => Span::styled("not watched", label),
    };
    lines.push(Line::from(vec![Span::styled("watch    ", label), watch]));
    lines.push(Line::from(vec![
        Span::styled("note     ", label),
        Span::styled(
            row.note.clone().unwrap_or_else(|| "-".to_string()),
            Style::default().fg(Color::LightCyan),
        ),
    ]));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

pub(super) fn render_preview_pane(frame: &mut Frame<'_>, model: &AppModel, area: Rect) {
    let title = model
        .selected_row()
        .map(|row| format!(" Snapshot {} ", row.key))
        .unwrap_or_else(|| " Snapshot ".to_string());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<String> = match model.selected_row() {
        None => Vec::new(),
        Some(row) if row.is_placeholder => vec![SHELL_PLACEHOLDER_LINE.to_string()],
        Some(row) => model
            .snapshot_for(&row.key)
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| vec!["(no snapshot yet)".to_string()]),
    };
    // Show the tail when the capture is taller than the pane.
    let visible = usize::from(inner.height.max(1));
    let skip = lines.len().saturating_sub(visible);
    let text = Text::from(
        lines
            .into_iter()
            .skip(skip)
            .map(Line::from)
            .collect::<Vec<_>>(),
    );
    frame.render_widget(Paragraph::new(text), inner);
}

pub(super) fn split_right_column(area: Rect) -> (Rect, Rect) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);
    (sections[0], sections[1])
}
