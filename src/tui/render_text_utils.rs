use chrono::{Local, TimeZone};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};

use crate::watch::WatchState;

use super::WatchBadge;

pub(super) fn format_clock(timestamp_unix: i64) -> String {
    match Local.timestamp_opt(timestamp_unix, 0).single() {
        Some(value) => value.format("%H:%M:%S").to_string(),
        None => "??:??:??".to_string(),
    }
}

pub(super) fn format_relative_age(timestamp_unix: i64, now_unix: i64) -> String {
    if timestamp_unix <= 0 {
        return "never".to_string();
    }
    let delta = now_unix.saturating_sub(timestamp_unix).max(0);
    if delta < 60 {
        format!("{delta}s ago")
    } else if delta < 3_600 {
        format!("{} min ago", delta / 60)
    } else {
        format!("{}h ago", delta / 3_600)
    }
}

pub(super) fn format_duration_short(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3_600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h{:02}m", secs / 3_600, (secs % 3_600) / 60)
    }
}

pub(super) fn watch_label(badge: &WatchBadge) -> String {
    match badge.state {
        WatchState::Quiescent => format!("W {}", format_duration_short(badge.threshold_secs)),
        WatchState::IdlePending => format!(
            "W idle {}/{}",
            format_duration_short(badge.idle_secs),
            format_duration_short(badge.threshold_secs)
        ),
        WatchState::Alerted => format!("W! idle {}", format_duration_short(badge.idle_secs)),
    }
}

pub(super) fn watch_style(state: WatchState) -> Style {
    match state {
        WatchState::Quiescent => Style::default().fg(Color::LightBlue),
        WatchState::IdlePending => Style::default().fg(Color::Yellow),
        WatchState::Alerted => Style::default().fg(Color::Red),
    }
}

pub(super) fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
