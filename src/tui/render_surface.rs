use ratatui::backend::TestBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::{Frame, Terminal};

use crate::context::now_unix;

use super::render_left_panes::render_sessions_pane;
use super::render_right_panes::{render_details_pane, render_preview_pane, split_right_column};
use super::render_screens::{
    render_error_log_screen, render_help_screen, render_prompt_overlay, render_snapshot_screen,
};
use super::render_sections::{render_header, render_status_bar};
use super::settings_render::render_settings_screen;
use super::{AppModel, Screen};

pub(super) fn render_to_string(model: &AppModel, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let Ok(mut terminal) = Terminal::new(backend) else {
        return String::new();
    };
    let mut preview = model.clone();
    if terminal.draw(|frame| render(frame, &mut preview)).is_err() {
        return String::new();
    }
    let buffer = terminal.backend().buffer();
    buffer
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect::<Vec<_>>()
        .join("")
}

pub(super) fn render(frame: &mut Frame<'_>, model: &mut AppModel) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());
    let now_unix = now_unix();
    render_header(frame, model, root[0], now_unix);

    let body = root[1];
    match model.screen() {
        Screen::Main | Screen::Settings => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(body);
            render_sessions_pane(frame, model, columns[0]);
            let (details, preview) = split_right_column(columns[1]);
            render_details_pane(frame, model, details);
            render_preview_pane(frame, model, preview);
            if model.screen() == Screen::Settings {
                render_settings_screen(frame, model, body);
            }
        }
        Screen::Snapshot => render_snapshot_screen(frame, model, body),
        Screen::ErrorLog => render_error_log_screen(frame, model, body),
        Screen::Help => render_help_screen(frame, body),
    }

    render_status_bar(frame, model, root[2]);
    render_prompt_overlay(frame, model);
}
