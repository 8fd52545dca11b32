use crossterm::event::{KeyCode, KeyEvent};

use crate::config::{MAX_WORKERS_LIMIT, MIN_REFRESH_INTERVAL_SECS};

use super::settings_types::{SettingsField, SettingsScreen};
use super::{AppModel, Screen, UiAction};

impl AppModel {
    pub(super) fn open_settings(&mut self) {
        self.settings = Some(SettingsScreen::from_config(&self.config));
        self.push_screen(Screen::Settings);
    }

    pub(super) fn handle_settings_key(&mut self, key: KeyEvent) {
        let Some(settings) = self.settings.as_mut() else {
            self.pop_screen();
            return;
        };

        if settings.editing {
            match key.code {
                KeyCode::Esc => {
                    settings.editing = false;
                    settings.edit_buffer.clear();
                }
                KeyCode::Enter => commit_edit(settings),
                KeyCode::Backspace => {
                    settings.edit_buffer.pop();
                }
                KeyCode::Char(ch) => settings.edit_buffer.push(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.pop_screen();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                settings.selected = (settings.selected + 1).min(SettingsField::max_index());
            }
            KeyCode::Char('k') | KeyCode::Up => {
                settings.selected = settings.selected.saturating_sub(1);
            }
            KeyCode::Char('s') => self.save_settings(),
            KeyCode::Enter | KeyCode::Char('i') => {
                let field = settings.selected_field();
                if field == SettingsField::Save {
                    self.save_settings();
                } else if field.is_text() {
                    settings.editing = true;
                    settings.edit_buffer = field.value(&settings.draft);
                    settings.feedback = None;
                }
            }
            _ => {}
        }
    }

    fn save_settings(&mut self) {
        let Some(settings) = self.settings.take() else {
            return;
        };
        let config = settings.draft.normalized();
        self.config = config.clone();
        self.queue(UiAction::SaveSettings(config));
        self.pop_screen();
    }
}

fn commit_edit(settings: &mut SettingsScreen) {
    let value = settings.edit_buffer.trim().to_string();
    let field = settings.selected_field();
    let result = match field {
        SettingsField::WebhookUrl => {
            settings.draft.webhook_url = value;
            Ok(())
        }
        SettingsField::RefreshInterval => parse_number::<u64>(&value).map(|secs| {
            settings.draft.refresh_interval_secs = secs.max(MIN_REFRESH_INTERVAL_SECS);
        }),
        SettingsField::DefaultWatchMinutes => parse_number::<u32>(&value).map(|minutes| {
            settings.draft.default_watch_minutes = minutes.max(1);
        }),
        SettingsField::MaxWorkers => parse_number::<usize>(&value).map(|workers| {
            settings.draft.max_workers = workers.clamp(1, MAX_WORKERS_LIMIT);
        }),
        SettingsField::CaptureLines => parse_number::<usize>(&value).map(|lines| {
            settings.draft.capture_lines = lines.max(1);
        }),
        SettingsField::Save => Ok(()),
    };
    settings.feedback = result
        .err()
        .map(|err| format!("{}: {err}", field.label()));
    settings.editing = false;
    settings.edit_buffer.clear();
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("'{value}' is not a valid number"))
}
