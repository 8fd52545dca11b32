use chrono::{Local, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::config::AppConfig;
use crate::domain::{NodeTimes, ReconciledItem, SessionKey};
use crate::error::CycleError;
use crate::watch::WatchRegistry;

pub const ERROR_LOG_MAX_ENTRIES: usize = 1_000;

/// User annotations per session. Survive the session itself.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct NoteBook {
    notes: BTreeMap<SessionKey, String>,
}

impl NoteBook {
    pub fn get(&self, key: &SessionKey) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    /// Stores `text` for `key`; empty text removes the note. Placeholders cannot carry notes.
    pub fn set(&mut self, key: SessionKey, text: &str) -> Result<(), String> {
        if key.is_placeholder() {
            return Err("placeholder rows cannot carry notes".to_string());
        }
        let text = text.trim();
        if text.is_empty() {
            self.notes.remove(&key);
        } else {
            self.notes.insert(key, text.to_string());
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &SessionKey) -> bool {
        self.notes.remove(key).is_some()
    }

    pub fn as_map(&self) -> &BTreeMap<SessionKey, String> {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        load_json(path, "notes")
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        save_json(path, self, "notes")
    }
}

/// Last captured lines per session.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct SnapshotStore {
    snapshots: BTreeMap<SessionKey, Vec<String>>,
}

impl SnapshotStore {
    pub fn get(&self, key: &SessionKey) -> Option<&[String]> {
        self.snapshots.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: SessionKey, lines: Vec<String>) {
        self.snapshots.insert(key, lines);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SessionKey, &Vec<String>)> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Replaces the store with this cycle's captures. Older entries survive only for sessions
    /// that are no longer live but still noted, so offline rows keep their last content.
    pub fn replace_with_captures(
        &mut self,
        captures: Vec<(SessionKey, Vec<String>)>,
        live_keys: &BTreeSet<SessionKey>,
        notes: &NoteBook,
    ) {
        let mut next: BTreeMap<SessionKey, Vec<String>> = captures.into_iter().collect();
        for (key, lines) in std::mem::take(&mut self.snapshots) {
            if !next.contains_key(&key) && !live_keys.contains(&key) && notes.get(&key).is_some() {
                next.insert(key, lines);
            }
        }
        self.snapshots = next;
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        load_json(path, "snapshots")
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        save_json(path, self, "snapshots")
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorLogEntry {
    pub timestamp: String,
    pub message: String,
}

/// Bounded, timestamped log of every failure shown to the operator.
#[derive(Clone, Debug, Default)]
pub struct ErrorLog {
    entries: Vec<ErrorLogEntry>,
}

impl ErrorLog {
    pub fn push(&mut self, now_unix: i64, message: impl Into<String>) {
        let timestamp = match Local.timestamp_opt(now_unix, 0).single() {
            Some(value) => value.format("%H:%M:%S").to_string(),
            None => "??:??:??".to_string(),
        };
        self.entries.push(ErrorLogEntry {
            timestamp,
            message: message.into(),
        });
        if self.entries.len() > ERROR_LOG_MAX_ENTRIES {
            let excess = self.entries.len() - ERROR_LOG_MAX_ENTRIES;
            self.entries.drain(0..excess);
        }
    }

    pub fn entries(&self) -> &[ErrorLogEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the last completed refresh cycle produced.
#[derive(Clone, Debug, Default)]
pub struct RefreshState {
    pub generation: u64,
    pub nodes: NodeTimes,
    pub items: Vec<ReconciledItem>,
    pub errors: Vec<CycleError>,
    pub refreshing: bool,
    pub last_refresh_unix: Option<i64>,
}

/// Every piece of mutable application state. Only ever touched through `AppContext`.
#[derive(Clone, Debug, Default)]
pub struct Workspace {
    pub config: AppConfig,
    pub notes: NoteBook,
    pub snapshots: SnapshotStore,
    pub watches: WatchRegistry,
    pub state: RefreshState,
    pub error_log: ErrorLog,
}

fn load_json<T: DeserializeOwned + Default>(path: &Path, what: &str) -> Result<T, String> {
    if !path.exists() {
        return Ok(T::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {what} file {:?}: {err}", path))?;
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&raw).map_err(|err| format!("failed to parse {what} file {:?}: {err}", path))
}

fn save_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create directory {:?}: {err}", parent))?;
    }
    let serialized = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize {what}: {err}"))?;
    fs::write(path, serialized).map_err(|err| format!("failed to write {what} file {:?}: {err}", path))
}
