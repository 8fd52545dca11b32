use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::domain::SessionKey;
use crate::store::{ErrorLogEntry, Workspace};

use super::settings_types::SettingsScreen;
use super::{Prompt, Screen, UiAction, UiRow, WatchBadge};

#[derive(Clone, Debug)]
pub struct AppModel {
    pub(super) user: String,
    pub(super) rows: Vec<UiRow>,
    pub(super) selected: usize,
    pub(super) snapshots: BTreeMap<SessionKey, Vec<String>>,
    pub(super) error_entries: Vec<ErrorLogEntry>,
    pub(super) generation: u64,
    pub(super) refreshing: bool,
    pub(super) last_refresh_unix: Option<i64>,
    pub(super) node_count: usize,
    pub(super) config: AppConfig,
    pub(super) screens: Vec<Screen>,
    pub(super) prompt: Option<Prompt>,
    pub(super) settings: Option<SettingsScreen>,
    pub(super) snapshot_scroll: u16,
    pub(super) error_log_scroll: u16,
    pub(super) viewport_height: u16,
    pub(super) status_message: Option<String>,
    pub(super) pending_actions: Vec<UiAction>,
}

impl AppModel {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            rows: Vec::new(),
            selected: 0,
            snapshots: BTreeMap::new(),
            error_entries: Vec::new(),
            generation: 0,
            refreshing: false,
            last_refresh_unix: None,
            node_count: 0,
            config: AppConfig::default(),
            screens: vec![Screen::Main],
            prompt: None,
            settings: None,
            snapshot_scroll: 0,
            error_log_scroll: 0,
            viewport_height: 1,
            status_message: None,
            pending_actions: Vec::new(),
        }
    }

    /// Pulls the latest published state into the view. The selection follows its session key
    /// when rows move around.
    pub fn sync_from_workspace(&mut self, workspace: &Workspace, now_unix: i64) {
        let selected_key = self.selected_row().map(|row| row.key.clone());
        let state = &workspace.state;
        self.rows = state
            .items
            .iter()
            .map(|item| {
                let key = item.key();
                let watch = workspace.watches.entry(&key).map(|entry| WatchBadge {
                    state: entry.state(now_unix),
                    idle_secs: entry.idle_secs(now_unix),
                    threshold_secs: entry.threshold_seconds,
                });
                UiRow {
                    time_left: state.nodes.get(&item.node).cloned(),
                    note: workspace.notes.get(&key).map(ToString::to_string),
                    is_placeholder: item.is_placeholder(),
                    is_stale: item.is_stale,
                    window_count: item.window_count,
                    watch,
                    key,
                }
            })
            .collect();
        self.snapshots = workspace
            .snapshots
            .iter()
            .map(|(key, lines)| (key.clone(), lines.clone()))
            .collect();
        self.error_entries = workspace.error_log.entries().to_vec();
        self.generation = state.generation;
        self.refreshing = state.refreshing;
        self.last_refresh_unix = state.last_refresh_unix;
        self.node_count = state.nodes.len();
        self.config = workspace.config.clone();

        self.selected = selected_key
            .and_then(|key| self.rows.iter().position(|row| row.key == key))
            .unwrap_or(self.selected)
            .min(self.rows.len().saturating_sub(1));
        self.clamp_scrolls();
    }

    pub fn rows(&self) -> &[UiRow] {
        &self.rows
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&UiRow> {
        self.rows.get(self.selected)
    }

    pub fn screen(&self) -> Screen {
        self.screens.last().copied().unwrap_or(Screen::Main)
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn snapshot_for(&self, key: &SessionKey) -> Option<&[String]> {
        self.snapshots.get(key).map(Vec::as_slice)
    }

    pub fn error_entries(&self) -> &[ErrorLogEntry] {
        &self.error_entries
    }

    pub fn take_actions(&mut self) -> Vec<UiAction> {
        std::mem::take(&mut self.pending_actions)
    }

    pub(super) fn queue(&mut self, action: UiAction) {
        self.pending_actions.push(action);
    }

    pub(super) fn push_screen(&mut self, screen: Screen) {
        if self.screen() != screen {
            self.screens.push(screen);
        }
    }

    /// Leaves the current screen. Returns false when already on the main list.
    pub(super) fn pop_screen(&mut self) -> bool {
        if self.screens.len() <= 1 {
            return false;
        }
        if self.screens.pop() == Some(Screen::Settings) {
            self.settings = None;
        }
        true
    }

    pub(super) fn counts(&self) -> (usize, usize, usize) {
        let active = self
            .rows
            .iter()
            .filter(|row| !row.is_stale && !row.is_placeholder)
            .count();
        let offline = self.rows.iter().filter(|row| row.is_stale).count();
        let watched = self.rows.iter().filter(|row| row.watch.is_some()).count();
        (active, offline, watched)
    }
}
