use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::render_helpers::{format_clock, format_relative_age};
use super::{AppModel, Screen};

pub(super) fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub(super) fn hint_style() -> Style {
    Style::default().fg(Color::Gray)
}

pub(super) fn render_header(frame: &mut Frame<'_>, model: &AppModel, area: Rect, now_unix: i64) {
    let (active, offline, watched) = model.counts();
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled(
            " slurmux ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  user ", label),
        Span::styled(model.user.clone(), value),
        Span::styled("  nodes ", label),
        Span::styled(model.node_count.to_string(), value),
        Span::styled("  active ", label),
        Span::styled(active.to_string(), value),
        Span::styled("  offline ", label),
        Span::styled(offline.to_string(), value),
        Span::styled("  watched ", label),
        Span::styled(watched.to_string(), value),
        Span::raw("  "),
    ];
    if model.refreshing {
        spans.push(Span::styled(
            "refreshing...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    } else if let Some(last) = model.last_refresh_unix {
        spans.push(Span::styled(
            format!(
                "updated {} ({})",
                format_clock(last),
                format_relative_age(last, now_unix)
            ),
            label,
        ));
    } else {
        spans.push(Span::styled("not refreshed yet", label));
    }
    if !model.error_entries.is_empty() {
        spans.push(Span::styled(
            format!("  errors {}", model.error_entries.len()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub(super) fn render_status_bar(frame: &mut Frame<'_>, model: &AppModel, area: Rect) {
    let shortcuts = if model.prompt.is_some() {
        "[enter] confirm  [esc] cancel"
    } else {
        match model.screen() {
            Screen::Main => {
                "[enter] attach [s] shell [n] note [w] watch [c] new [x] kill [r] refresh [?] help [q] quit"
            }
            Screen::Snapshot => "[j/k] scroll  [u/d] page  [g/G] top/bottom  [r] refresh  [q] back",
            Screen::ErrorLog => "[j/k] scroll  [u/d] page  [c] clear  [q] back",
            Screen::Help => "[q] back",
            Screen::Settings => "[j/k] select  [enter] edit  [s] save  [esc] close",
        }
    };
    let message = model.status_message.clone().unwrap_or_default();
    let shortcuts_width = shortcuts.len().min(u16::MAX as usize) as u16;
    let sections = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(shortcuts_width)])
        .split(area);
    frame.render_widget(
        Paragraph::new(format!(" {message}")).style(Style::default().fg(Color::Yellow)),
        sections[0],
    );
    frame.render_widget(Paragraph::new(shortcuts).style(hint_style()), sections[1]);
}
