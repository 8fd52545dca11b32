use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Placeholder session offered for nodes without any live tmux session.
pub const START_SHELL: &str = "<Start Shell>";

/// Node hostname to scheduler-reported remaining allocation.
pub type NodeTimes = BTreeMap<String, String>;

/// Canonical identity of a session across notes, snapshots and watches.
///
/// Persisted as `node:session`. Hostnames never contain `:` and tmux refuses it in
/// session names, so the first `:` always separates the two fields.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SessionKey {
    pub node: String,
    pub session: String,
}

impl SessionKey {
    pub fn new(node: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            session: session.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.session == START_SHELL
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.session)
    }
}

impl FromStr for SessionKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (node, session) = raw
            .split_once(':')
            .ok_or_else(|| format!("session key '{raw}' is missing ':' separator"))?;
        if node.is_empty() || session.is_empty() {
            return Err(format!("session key '{raw}' has an empty node or session"));
        }
        Ok(Self::new(node, session))
    }
}

impl Serialize for SessionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionRef {
    pub node: String,
    pub session_name: String,
    pub window_count: u32,
}

impl SessionRef {
    pub fn new(node: impl Into<String>, session_name: impl Into<String>, window_count: u32) -> Self {
        Self {
            node: node.into(),
            session_name: session_name.into(),
            window_count,
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.node, &self.session_name)
    }
}

/// One row of the merged live + persisted view.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReconciledItem {
    pub node: String,
    pub session_name: String,
    pub window_count: u32,
    pub is_stale: bool,
}

impl ReconciledItem {
    pub fn live(session: &SessionRef) -> Self {
        Self {
            node: session.node.clone(),
            session_name: session.session_name.clone(),
            window_count: session.window_count,
            is_stale: false,
        }
    }

    pub fn start_shell(node: &str) -> Self {
        Self {
            node: node.to_string(),
            session_name: START_SHELL.to_string(),
            window_count: 0,
            is_stale: false,
        }
    }

    pub fn stale(key: &SessionKey) -> Self {
        Self {
            node: key.node.clone(),
            session_name: key.session.clone(),
            window_count: 0,
            is_stale: true,
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.node, &self.session_name)
    }

    pub fn is_placeholder(&self) -> bool {
        self.session_name == START_SHELL
    }
}
