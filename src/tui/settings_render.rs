use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use super::AppModel;
use super::render_helpers::centered_rect;
use super::settings_types::SettingsField;

fn redact_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "(not set)".to_string();
    }
    // Webhook URLs carry their secret in the path; keep only scheme and host.
    match trimmed.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or(rest);
            format!("{scheme}://{host}/...")
        }
        None => "********".to_string(),
    }
}

pub(super) fn render_settings_screen(frame: &mut Frame<'_>, model: &AppModel, area: Rect) {
    let Some(settings) = model.settings.as_ref() else {
        return;
    };
    let area = centered_rect(70, 60, area);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::with_capacity(SettingsField::ALL.len() + 3);
    for (index, field) in SettingsField::ALL.iter().enumerate() {
        let is_selected = index == settings.selected;
        let marker = if is_selected { "▸ " } else { "  " };
        let row_style = if is_selected {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if *field == SettingsField::Save {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("{marker}[ Save ]"),
                row_style.fg(Color::Yellow),
            )));
            continue;
        }
        let value = if is_selected && settings.editing {
            format!("{}_", settings.edit_buffer)
        } else if *field == SettingsField::WebhookUrl {
            redact_url(&settings.draft.webhook_url)
        } else {
            field.value(&settings.draft)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<22}", field.label()), row_style),
            Span::raw(value),
        ]));
    }
    if let Some(feedback) = &settings.feedback {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            feedback.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}
