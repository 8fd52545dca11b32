use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::SessionKey;

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct WatchEntry {
    pub threshold_seconds: i64,
    pub last_change_unix: i64,
    #[serde(default)]
    pub last_content_hash: String,
    #[serde(default)]
    pub alert_sent: bool,
}

impl WatchEntry {
    pub fn new(threshold_seconds: i64, now_unix: i64) -> Self {
        Self {
            threshold_seconds: threshold_seconds.max(1),
            last_change_unix: now_unix,
            last_content_hash: String::new(),
            alert_sent: false,
        }
    }

    pub fn idle_secs(&self, now_unix: i64) -> i64 {
        (now_unix - self.last_change_unix).max(0)
    }

    pub fn state(&self, now_unix: i64) -> WatchState {
        if self.alert_sent {
            WatchState::Alerted
        } else if self.last_content_hash.is_empty() || self.idle_secs(now_unix) == 0 {
            WatchState::Quiescent
        } else {
            WatchState::IdlePending
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WatchState {
    Quiescent,
    IdlePending,
    Alerted,
}

impl WatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            WatchState::Quiescent => "active",
            WatchState::IdlePending => "idle",
            WatchState::Alerted => "alerted",
        }
    }
}

/// Result of feeding one capture into the watch state machine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WatchOutcome {
    NotWatched,
    Changed,
    Idle { idle_secs: i64 },
    AlertDue { idle_secs: i64 },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct WatchRegistry {
    entries: BTreeMap<SessionKey, WatchEntry>,
}

impl WatchRegistry {
    /// Starts watching `key`; placeholder rows cannot be watched.
    pub fn watch(&mut self, key: SessionKey, threshold_seconds: i64, now_unix: i64) -> bool {
        if key.is_placeholder() {
            return false;
        }
        self.entries
            .insert(key, WatchEntry::new(threshold_seconds, now_unix));
        true
    }

    pub fn unwatch(&mut self, key: &SessionKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn is_watched(&self, key: &SessionKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entry(&self, key: &SessionKey) -> Option<&WatchEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&SessionKey, &WatchEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advances the state machine for `key` with freshly captured `lines`.
    ///
    /// A new hash resets the idle clock and re-arms alerting. An unchanged hash idle for
    /// longer than the threshold yields `AlertDue` exactly once and marks the alert sent.
    pub fn observe(&mut self, key: &SessionKey, lines: &[String], now_unix: i64) -> WatchOutcome {
        let Some(entry) = self.entries.get_mut(key) else {
            return WatchOutcome::NotWatched;
        };
        let hash = content_hash(lines);
        if hash != entry.last_content_hash {
            entry.last_content_hash = hash;
            entry.last_change_unix = now_unix;
            entry.alert_sent = false;
            return WatchOutcome::Changed;
        }
        let idle_secs = entry.idle_secs(now_unix);
        if idle_secs > entry.threshold_seconds && !entry.alert_sent {
            entry.alert_sent = true;
            return WatchOutcome::AlertDue { idle_secs };
        }
        WatchOutcome::Idle { idle_secs }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create state directory {:?}: {err}", parent))?;
        }
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize watches: {err}"))?;
        fs::write(path, serialized)
            .map_err(|err| format!("failed to write watch file {:?}: {err}", path))
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("failed to read watch file {:?}: {err}", path))?;
        serde_json::from_str(&raw)
            .map_err(|err| format!("failed to parse watch file {:?}: {err}", path))
    }
}

pub fn content_hash(lines: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(lines.join("\n").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Parses a threshold typed in minutes. Blank input takes `default_minutes`.
pub fn parse_threshold_minutes(input: &str, default_minutes: u32) -> Result<i64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(i64::from(default_minutes.max(1)) * 60);
    }
    let minutes = trimmed
        .parse::<f64>()
        .map_err(|_| format!("invalid threshold '{trimmed}': expected minutes"))?;
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(format!("invalid threshold '{trimmed}': must be positive"));
    }
    Ok(((minutes * 60.0).round() as i64).max(1))
}
