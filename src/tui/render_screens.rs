use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use super::render_helpers::centered_rect;
use super::render_sections::border_style;
use super::{AppModel, PromptKind};

const HELP_ROWS: &[(&str, &str)] = &[
    ("j / k, arrows", "move selection"),
    ("g / G", "first / last row"),
    ("enter", "attach to session (placeholder opens a shell)"),
    ("s", "open a login shell on the node"),
    ("S", "snapshot view of every session"),
    ("n", "add or edit the note on the row"),
    ("d", "delete the note"),
    ("w", "watch / unwatch for idle output"),
    ("c", "create a tmux session on the node"),
    ("x", "kill the session (asks first)"),
    ("r", "refresh now"),
    ("e", "error log"),
    (",", "settings"),
    ("?", "this help"),
    ("q / esc", "back, or quit from the list"),
];

fn screen_block(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style(true))
}

pub(super) fn render_snapshot_screen(frame: &mut Frame<'_>, model: &mut AppModel, area: Rect) {
    let block = screen_block("Snapshots");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    model.set_viewport_height(inner.height);

    let header = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let lines: Vec<Line<'static>> = model
        .snapshot_screen_lines()
        .into_iter()
        .map(|line| {
            if line.starts_with("== ") {
                Line::from(Span::styled(line, header))
            } else {
                Line::from(line)
            }
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).scroll((model.snapshot_scroll, 0)),
        inner,
    );
}

pub(super) fn render_error_log_screen(frame: &mut Frame<'_>, model: &mut AppModel, area: Rect) {
    let block = screen_block(&format!("Error log ({})", model.error_entries.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    model.set_viewport_height(inner.height);

    if model.error_entries.is_empty() {
        frame.render_widget(
            Paragraph::new("No errors recorded.").style(Style::default().fg(Color::Gray)),
            inner,
        );
        return;
    }
    let lines: Vec<Line<'static>> = model
        .error_entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", entry.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(entry.message.clone(), Style::default().fg(Color::Red)),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).scroll((model.error_log_scroll, 0)),
        inner,
    );
}

pub(super) fn render_help_screen(frame: &mut Frame<'_>, area: Rect) {
    let block = screen_block("Help");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let key_style = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);
    let lines: Vec<Line<'static>> = HELP_ROWS
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("  {keys:<16}"), key_style),
                Span::raw(*action),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

pub(super) fn render_prompt_overlay(frame: &mut Frame<'_>, model: &AppModel) {
    let Some(prompt) = model.prompt.as_ref() else {
        return;
    };
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(prompt.kind.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match &prompt.kind {
        PromptKind::ConfirmKill(_) => vec![Line::from("Press y to kill the session, any other key to cancel.")],
        PromptKind::WatchMinutes(_) => vec![
            Line::from(format!("> {}_", prompt.buffer)),
            Line::from(Span::styled(
                "blank keeps the default",
                Style::default().fg(Color::Gray),
            )),
        ],
        PromptKind::Note(_) => vec![
            Line::from(format!("> {}_", prompt.buffer)),
            Line::from(Span::styled(
                "empty text removes the note",
                Style::default().fg(Color::Gray),
            )),
        ],
        PromptKind::NewSession { .. } => vec![Line::from(format!("> {}_", prompt.buffer))],
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
