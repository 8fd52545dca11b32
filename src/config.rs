use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

mod paths;

pub use self::paths::{StorePaths, default_data_dir};

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_WATCH_MINUTES: u32 = 5;
pub const DEFAULT_MAX_WORKERS: usize = 20;
pub const MAX_WORKERS_LIMIT: usize = 64;
pub const DEFAULT_CAPTURE_LINES: usize = 10;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AppConfig {
    pub webhook_url: String,
    pub refresh_interval_secs: u64,
    pub default_watch_minutes: u32,
    pub max_workers: usize,
    pub capture_lines: usize,
    pub connect_timeout_secs: u64,
    pub capture_connect_timeout_secs: u64,
    pub command_timeout_secs: u64,
    pub webhook_timeout_secs: u64,
    /// Keys this version does not know about; written back untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            default_watch_minutes: DEFAULT_WATCH_MINUTES,
            max_workers: DEFAULT_MAX_WORKERS,
            capture_lines: DEFAULT_CAPTURE_LINES,
            connect_timeout_secs: 2,
            capture_connect_timeout_secs: 3,
            command_timeout_secs: 15,
            webhook_timeout_secs: 5,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct PartialAppConfig {
    webhook_url: Option<String>,
    refresh_interval_secs: Option<u64>,
    default_watch_minutes: Option<u32>,
    max_workers: Option<usize>,
    capture_lines: Option<usize>,
    connect_timeout_secs: Option<u64>,
    capture_connect_timeout_secs: Option<u64>,
    command_timeout_secs: Option<u64>,
    webhook_timeout_secs: Option<u64>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl AppConfig {
    /// Missing file means defaults. A file that exists but does not parse is an error the
    /// caller is expected to report before falling back to defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("failed reading config {:?}: {err}", path))?;
        let partial: PartialAppConfig = serde_json::from_str(&raw)
            .map_err(|err| format!("failed parsing config {:?}: {err}", path))?;
        Ok(Self::default().merged(partial))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed creating config directory {:?}: {err}", parent))?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|err| format!("failed serializing config: {err}"))?;
        fs::write(path, raw).map_err(|err| format!("failed writing config {:?}: {err}", path))
    }

    fn merged(mut self, partial: PartialAppConfig) -> Self {
        if let Some(value) = partial.webhook_url {
            self.webhook_url = value.trim().to_string();
        }
        if let Some(value) = partial.refresh_interval_secs {
            self.refresh_interval_secs = value;
        }
        if let Some(value) = partial.default_watch_minutes {
            self.default_watch_minutes = value;
        }
        if let Some(value) = partial.max_workers {
            self.max_workers = value;
        }
        if let Some(value) = partial.capture_lines {
            self.capture_lines = value;
        }
        if let Some(value) = partial.connect_timeout_secs {
            self.connect_timeout_secs = value;
        }
        if let Some(value) = partial.capture_connect_timeout_secs {
            self.capture_connect_timeout_secs = value;
        }
        if let Some(value) = partial.command_timeout_secs {
            self.command_timeout_secs = value;
        }
        if let Some(value) = partial.webhook_timeout_secs {
            self.webhook_timeout_secs = value;
        }
        self.extra = partial.extra;
        self.normalized()
    }

    pub fn normalized(mut self) -> Self {
        self.refresh_interval_secs = self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS);
        self.default_watch_minutes = self.default_watch_minutes.max(1);
        self.max_workers = self.max_workers.clamp(1, MAX_WORKERS_LIMIT);
        self.capture_lines = self.capture_lines.max(1);
        self.connect_timeout_secs = self.connect_timeout_secs.max(1);
        self.capture_connect_timeout_secs = self.capture_connect_timeout_secs.max(1);
        self.command_timeout_secs = self
            .command_timeout_secs
            .max(self.connect_timeout_secs.max(self.capture_connect_timeout_secs) + 1);
        self.webhook_timeout_secs = self.webhook_timeout_secs.max(1);
        self
    }

    pub fn webhook(&self) -> Option<&str> {
        let url = self.webhook_url.trim();
        (!url.is_empty()).then_some(url)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs.max(1))
    }
}
