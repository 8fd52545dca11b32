use thiserror::Error;

use crate::domain::SessionKey;

/// Failures collected while refreshing or acting on sessions. None of them abort a cycle;
/// they are surfaced in the error log instead.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CycleError {
    #[error("discovery: {0}")]
    Discovery(String),
    #[error("probe: {message}")]
    Probe { node: String, message: String },
    #[error("capture {key}: {message}")]
    Capture { key: SessionKey, message: String },
    #[error("alert {key}: {message}")]
    Alert { key: SessionKey, message: String },
    #[error("persist: {0}")]
    Persist(String),
    #[error("command: {0}")]
    Command(String),
    #[error("refresh crashed: {0}")]
    Crashed(String),
}
