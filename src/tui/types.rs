use crate::config::AppConfig;
use crate::domain::SessionKey;
use crate::watch::WatchState;

/// One row of the session list, flattened from the published refresh state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UiRow {
    pub key: SessionKey,
    pub window_count: u32,
    pub is_stale: bool,
    pub is_placeholder: bool,
    pub time_left: Option<String>,
    pub note: Option<String>,
    pub watch: Option<WatchBadge>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct WatchBadge {
    pub state: WatchState,
    pub idle_secs: i64,
    pub threshold_secs: i64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Screen {
    Main,
    Snapshot,
    ErrorLog,
    Help,
    Settings,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PromptKind {
    Note(SessionKey),
    WatchMinutes(SessionKey),
    NewSession { node: String },
    ConfirmKill(SessionKey),
}

impl PromptKind {
    pub fn title(&self) -> String {
        match self {
            PromptKind::Note(key) => format!(" Note for {key} "),
            PromptKind::WatchMinutes(key) => format!(" Idle minutes before alerting on {key} "),
            PromptKind::NewSession { node } => format!(" New tmux session on {node} "),
            PromptKind::ConfirmKill(key) => format!(" Kill {key}? "),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
}

/// Work the key handler queued for the runtime; the model itself never touches the workspace.
#[derive(Clone, Debug, PartialEq)]
pub enum UiAction {
    Refresh,
    Attach(SessionKey),
    OpenShell { node: String },
    SetNote { key: SessionKey, text: String },
    DeleteNote(SessionKey),
    Watch { key: SessionKey, minutes: String },
    Unwatch(SessionKey),
    CreateSession { node: String, name: String },
    KillSession(SessionKey),
    SaveSettings(AppConfig),
    ClearErrors,
}

/// What the runtime must do after an action was applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FollowUp {
    None,
    Refresh,
    Handoff(Vec<String>),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AppEventResult {
    Continue,
    Quit,
}
