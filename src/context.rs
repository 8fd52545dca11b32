use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::config::{AppConfig, StorePaths};
use crate::domain::SessionKey;
use crate::error::CycleError;
use crate::store::{NoteBook, RefreshState, SnapshotStore, Workspace};
use crate::watch::{WatchRegistry, parse_threshold_minutes};

/// Handle to the shared workspace. Cloning shares the same state; every access locks.
#[derive(Clone, Debug)]
pub struct AppContext {
    workspace: Arc<Mutex<Workspace>>,
    paths: StorePaths,
}

impl AppContext {
    /// Loads config, notes, snapshots and watches. Unreadable files fall back to empty
    /// defaults and the problem is kept in the error log.
    pub fn load(paths: StorePaths) -> Self {
        let now = now_unix();
        let mut workspace = Workspace::default();
        match AppConfig::load_from_path(&paths.config) {
            Ok(config) => workspace.config = config,
            Err(err) => record_load_error(&mut workspace, now, err),
        }
        match NoteBook::load_from_path(&paths.notes) {
            Ok(notes) => workspace.notes = notes,
            Err(err) => record_load_error(&mut workspace, now, err),
        }
        match SnapshotStore::load_from_path(&paths.snapshots) {
            Ok(snapshots) => workspace.snapshots = snapshots,
            Err(err) => record_load_error(&mut workspace, now, err),
        }
        match WatchRegistry::load_from_path(&paths.watches) {
            Ok(watches) => workspace.watches = watches,
            Err(err) => record_load_error(&mut workspace, now, err),
        }
        Self::from_workspace(workspace, paths)
    }

    pub fn from_workspace(workspace: Workspace, paths: StorePaths) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(workspace)),
            paths,
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn lock(&self) -> MutexGuard<'_, Workspace> {
        self.workspace.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> AppConfig {
        self.lock().config.clone()
    }

    pub fn published(&self) -> RefreshState {
        self.lock().state.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().state.refreshing
    }

    pub fn set_note(&self, key: SessionKey, text: &str) -> Result<(), String> {
        let mut workspace = self.lock();
        workspace.notes.set(key, text)?;
        let result = workspace.notes.save_to_path(&self.paths.notes);
        record_persist_result(&mut workspace, result);
        Ok(())
    }

    pub fn delete_note(&self, key: &SessionKey) -> bool {
        let mut workspace = self.lock();
        if !workspace.notes.remove(key) {
            return false;
        }
        let result = workspace.notes.save_to_path(&self.paths.notes);
        record_persist_result(&mut workspace, result);
        // Drop the offline row right away instead of waiting for the next cycle.
        workspace
            .state
            .items
            .retain(|item| !(item.is_stale && item.key() == *key));
        true
    }

    /// Starts watching `key`, reading the threshold in minutes (blank means the configured
    /// default). Returns the threshold in seconds.
    pub fn watch(&self, key: SessionKey, minutes_input: &str) -> Result<i64, String> {
        if key.is_placeholder() {
            return Err("placeholder rows cannot be watched".to_string());
        }
        let mut workspace = self.lock();
        let threshold =
            parse_threshold_minutes(minutes_input, workspace.config.default_watch_minutes)?;
        workspace.watches.watch(key, threshold, now_unix());
        let result = workspace.watches.save_to_path(&self.paths.watches);
        record_persist_result(&mut workspace, result);
        Ok(threshold)
    }

    pub fn unwatch(&self, key: &SessionKey) -> bool {
        let mut workspace = self.lock();
        if !workspace.watches.unwatch(key) {
            return false;
        }
        let result = workspace.watches.save_to_path(&self.paths.watches);
        record_persist_result(&mut workspace, result);
        true
    }

    pub fn update_config(&self, config: AppConfig) -> Result<(), String> {
        let config = config.normalized();
        let result = config.save_to_path(&self.paths.config);
        let mut workspace = self.lock();
        workspace.config = config;
        if let Err(err) = &result {
            workspace
                .error_log
                .push(now_unix(), CycleError::Persist(err.clone()).to_string());
        }
        result
    }

    pub fn record_error(&self, error: CycleError) {
        warn!(%error, "recorded error");
        self.lock().error_log.push(now_unix(), error.to_string());
    }

    pub fn clear_error_log(&self) {
        self.lock().error_log.clear();
    }
}

fn record_load_error(workspace: &mut Workspace, now: i64, err: String) {
    warn!(error = %err, "falling back to defaults");
    workspace
        .error_log
        .push(now, CycleError::Persist(err).to_string());
}

fn record_persist_result(workspace: &mut Workspace, result: Result<(), String>) {
    if let Err(err) = result {
        warn!(error = %err, "persist failed");
        workspace
            .error_log
            .push(now_unix(), CycleError::Persist(err).to_string());
    }
}

pub fn now_unix() -> i64 {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(duration) => duration.as_secs() as i64,
        Err(_) => 0,
    }
}
