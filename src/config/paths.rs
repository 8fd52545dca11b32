use std::path::{Path, PathBuf};

pub fn default_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join("slurmux");
    }
    PathBuf::from(".config").join("slurmux")
}

/// Locations of every file slurmux reads or writes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorePaths {
    pub config: PathBuf,
    pub notes: PathBuf,
    pub snapshots: PathBuf,
    pub watches: PathBuf,
    pub log: PathBuf,
}

impl StorePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join("config.json"),
            notes: dir.join("notes.json"),
            snapshots: dir.join("snapshots.json"),
            watches: dir.join("watches.json"),
            log: dir.join("slurmux.log"),
        }
    }

    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        if let Some(path) = config {
            self.config = path;
        }
        self
    }
}

impl Default for StorePaths {
    fn default() -> Self {
        Self::in_dir(&default_data_dir())
    }
}
