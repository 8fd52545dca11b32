use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{AppEventResult, AppModel, Prompt, PromptKind, Screen, UiAction};

impl AppModel {
    pub fn handle_key(&mut self, key: KeyEvent) -> AppEventResult {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEventResult::Quit;
        }
        self.clear_status_message();
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return AppEventResult::Continue;
        }
        match self.screen() {
            Screen::Main => return self.handle_main_key(key),
            Screen::Settings => self.handle_settings_key(key),
            Screen::Snapshot => self.handle_snapshot_key(key),
            Screen::ErrorLog => self.handle_error_log_key(key),
            Screen::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
                ) {
                    self.pop_screen();
                }
            }
        }
        AppEventResult::Continue
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> AppEventResult {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return AppEventResult::Quit,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('g') | KeyCode::Home => self.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.select_last(),
            KeyCode::Enter => self.attach_selected(),
            KeyCode::Char('s') => {
                if let Some(row) = self.selected_row() {
                    let node = row.key.node.clone();
                    self.queue(UiAction::OpenShell { node });
                }
            }
            KeyCode::Char('S') => {
                self.snapshot_scroll = 0;
                self.push_screen(Screen::Snapshot);
            }
            KeyCode::Char('n') => self.begin_note(),
            KeyCode::Char('d') => self.delete_selected_note(),
            KeyCode::Char('w') => self.toggle_selected_watch(),
            KeyCode::Char('c') => {
                if let Some(row) = self.selected_row() {
                    let node = row.key.node.clone();
                    self.open_prompt(PromptKind::NewSession { node }, String::new());
                }
            }
            KeyCode::Char('x') => self.begin_kill(),
            KeyCode::Char('r') => self.queue(UiAction::Refresh),
            KeyCode::Char('e') => {
                self.error_log_scroll = self.max_error_log_scroll();
                self.push_screen(Screen::ErrorLog);
            }
            KeyCode::Char(',') => self.open_settings(),
            KeyCode::Char('?') => self.push_screen(Screen::Help),
            _ => {}
        }
        AppEventResult::Continue
    }

    fn handle_snapshot_key(&mut self, key: KeyEvent) {
        let page = self.page();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.pop_screen();
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_snapshot(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_snapshot(-1),
            KeyCode::Char('d') | KeyCode::PageDown => self.scroll_snapshot(page),
            KeyCode::Char('u') | KeyCode::PageUp => self.scroll_snapshot(-page),
            KeyCode::Char('g') | KeyCode::Home => self.snapshot_scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.snapshot_scroll = self.max_snapshot_scroll(),
            KeyCode::Char('r') => self.queue(UiAction::Refresh),
            _ => {}
        }
    }

    fn handle_error_log_key(&mut self, key: KeyEvent) {
        let page = self.page();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.pop_screen();
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_error_log(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_error_log(-1),
            KeyCode::Char('d') | KeyCode::PageDown => self.scroll_error_log(page),
            KeyCode::Char('u') | KeyCode::PageUp => self.scroll_error_log(-page),
            KeyCode::Char('c') => {
                self.error_entries.clear();
                self.error_log_scroll = 0;
                self.queue(UiAction::ClearErrors);
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        if let PromptKind::ConfirmKill(target) = &prompt.kind {
            let target = target.clone();
            self.prompt = None;
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.queue(UiAction::KillSession(target));
            } else {
                self.set_status_message("kill cancelled");
            }
            return;
        }
        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                prompt.buffer.pop();
            }
            KeyCode::Char(ch) => prompt.buffer.push(ch),
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit_prompt(prompt);
                }
            }
            _ => {}
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        let text = prompt.buffer.trim().to_string();
        match prompt.kind {
            PromptKind::Note(key) => self.queue(UiAction::SetNote { key, text }),
            PromptKind::WatchMinutes(key) => self.queue(UiAction::Watch { key, minutes: text }),
            PromptKind::NewSession { node } => {
                if text.is_empty() {
                    self.set_status_message("session name cannot be empty");
                } else {
                    self.queue(UiAction::CreateSession { node, name: text });
                }
            }
            PromptKind::ConfirmKill(key) => self.queue(UiAction::KillSession(key)),
        }
    }

    fn open_prompt(&mut self, kind: PromptKind, buffer: String) {
        self.prompt = Some(Prompt { kind, buffer });
    }

    fn attach_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.is_placeholder {
            let node = row.key.node.clone();
            self.queue(UiAction::OpenShell { node });
        } else if row.is_stale {
            let message = format!("{} is offline", row.key);
            self.set_status_message(message);
        } else {
            let key = row.key.clone();
            self.queue(UiAction::Attach(key));
        }
    }

    fn begin_note(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.is_placeholder {
            self.set_status_message("placeholder rows cannot carry notes");
            return;
        }
        let key = row.key.clone();
        let existing = row.note.clone().unwrap_or_default();
        self.open_prompt(PromptKind::Note(key), existing);
    }

    fn delete_selected_note(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.note.is_some() {
            let key = row.key.clone();
            self.queue(UiAction::DeleteNote(key));
        } else {
            self.set_status_message("no note on this row");
        }
    }

    fn toggle_selected_watch(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let key = row.key.clone();
        if row.watch.is_some() {
            self.queue(UiAction::Unwatch(key));
        } else if row.is_placeholder || row.is_stale {
            self.set_status_message("only live sessions can be watched");
        } else {
            let default = self.config.default_watch_minutes.to_string();
            self.open_prompt(PromptKind::WatchMinutes(key), default);
        }
    }

    fn begin_kill(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.is_placeholder || row.is_stale {
            self.set_status_message("no live session to kill");
            return;
        }
        let key = row.key.clone();
        self.open_prompt(PromptKind::ConfirmKill(key), String::new());
    }
}
