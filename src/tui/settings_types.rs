use crate::config::AppConfig;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) enum SettingsField {
    WebhookUrl,
    RefreshInterval,
    DefaultWatchMinutes,
    MaxWorkers,
    CaptureLines,
    Save,
}

impl SettingsField {
    pub(super) const ALL: [SettingsField; 6] = [
        SettingsField::WebhookUrl,
        SettingsField::RefreshInterval,
        SettingsField::DefaultWatchMinutes,
        SettingsField::MaxWorkers,
        SettingsField::CaptureLines,
        SettingsField::Save,
    ];

    pub(super) fn from_index(index: usize) -> Self {
        Self::ALL
            .get(index)
            .copied()
            .unwrap_or(SettingsField::Save)
    }

    pub(super) fn max_index() -> usize {
        Self::ALL.len() - 1
    }

    pub(super) fn label(self) -> &'static str {
        match self {
            SettingsField::WebhookUrl => "Webhook URL",
            SettingsField::RefreshInterval => "Refresh interval (s)",
            SettingsField::DefaultWatchMinutes => "Default watch (min)",
            SettingsField::MaxWorkers => "Max parallel ssh",
            SettingsField::CaptureLines => "Snapshot lines",
            SettingsField::Save => "Save",
        }
    }

    pub(super) fn is_text(self) -> bool {
        self != SettingsField::Save
    }

    pub(super) fn value(self, draft: &AppConfig) -> String {
        match self {
            SettingsField::WebhookUrl => draft.webhook_url.clone(),
            SettingsField::RefreshInterval => draft.refresh_interval_secs.to_string(),
            SettingsField::DefaultWatchMinutes => draft.default_watch_minutes.to_string(),
            SettingsField::MaxWorkers => draft.max_workers.to_string(),
            SettingsField::CaptureLines => draft.capture_lines.to_string(),
            SettingsField::Save => String::new(),
        }
    }
}

/// Draft copy of the config being edited on the settings screen.
#[derive(Clone, Debug)]
pub(super) struct SettingsScreen {
    pub(super) selected: usize,
    pub(super) editing: bool,
    pub(super) edit_buffer: String,
    pub(super) draft: AppConfig,
    pub(super) feedback: Option<String>,
}

impl SettingsScreen {
    pub(super) fn from_config(config: &AppConfig) -> Self {
        Self {
            selected: 0,
            editing: false,
            edit_buffer: String::new(),
            draft: config.clone(),
            feedback: None,
        }
    }

    pub(super) fn selected_field(&self) -> SettingsField {
        SettingsField::from_index(self.selected.min(SettingsField::max_index()))
    }
}
