use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::domain::START_SHELL;
use crate::remote::{CommandRunner, batch_ssh_args, shell_quote};

mod parser;

pub use parser::{ProbeFailure, classify_list_failure, parse_session_list, validate_session_name};

pub const SHELL_PLACEHOLDER_LINE: &str = "(Shell - No Active Session)";
const LIST_SESSIONS_COMMAND: &str = "tmux list-sessions -F '#{session_name}:#{session_windows}'";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProbeConfig {
    pub connect_timeout_secs: u64,
    pub capture_connect_timeout_secs: u64,
    pub capture_lines: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ProbeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            connect_timeout_secs: config.connect_timeout_secs,
            capture_connect_timeout_secs: config.capture_connect_timeout_secs,
            capture_lines: config.capture_lines,
        }
    }
}

/// Talks to tmux on remote nodes over batch-mode ssh.
pub struct SessionProber<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    config: ProbeConfig,
}

impl<'a, R: CommandRunner + ?Sized> SessionProber<'a, R> {
    pub fn new(runner: &'a R, config: ProbeConfig) -> Self {
        Self { runner, config }
    }

    /// Sessions on `node` as `(name, window_count)`. An absent tmux server is an empty list;
    /// only transport failures come back as an error string.
    pub fn list_sessions(&self, node: &str) -> (Vec<(String, u32)>, Option<String>) {
        let args = batch_ssh_args(node, self.config.connect_timeout_secs, LIST_SESSIONS_COMMAND);
        match self.runner.run("ssh", &args) {
            Ok(output) if output.success => (parse_session_list(&output.stdout), None),
            Ok(output) => match classify_list_failure(&output.stderr) {
                ProbeFailure::NoSessions => {
                    debug!(node, stderr = %output.stderr.trim(), "no tmux sessions");
                    (Vec::new(), None)
                }
                ProbeFailure::Connectivity(message) => {
                    warn!(node, %message, "node unreachable");
                    (Vec::new(), Some(format!("{node}: {message}")))
                }
            },
            Err(err) => {
                warn!(node, error = %err, "node probe failed");
                (Vec::new(), Some(format!("{node}: {err}")))
            }
        }
    }

    /// Last lines of the session's active pane. Failures become a single descriptive line.
    pub fn capture(&self, node: &str, session: &str) -> Vec<String> {
        match self.try_capture(node, session) {
            Ok(lines) => lines,
            Err(err) => vec![format!("Error fetching snapshot: {err}")],
        }
    }

    pub fn try_capture(&self, node: &str, session: &str) -> Result<Vec<String>, String> {
        if session == START_SHELL {
            return Ok(vec![SHELL_PLACEHOLDER_LINE.to_string()]);
        }
        let remote = format!(
            "tmux capture-pane -p -t {} -S -{}",
            shell_quote(session),
            self.config.capture_lines
        );
        let args = batch_ssh_args(node, self.config.capture_connect_timeout_secs, &remote);
        let output = self.runner.run("ssh", &args)?;
        if output.success {
            Ok(output.stdout.lines().map(ToString::to_string).collect())
        } else {
            Err(first_line_or(&output.stderr, "capture-pane exited with an error"))
        }
    }

    pub fn kill_session(&self, node: &str, session: &str) -> Result<(), String> {
        if session == START_SHELL {
            return Err("no session to kill on this node".to_string());
        }
        let remote = format!("tmux kill-session -t {}", shell_quote(session));
        self.run_mutation(node, &remote)
            .map_err(|err| format!("failed to kill {node}:{session}: {err}"))
    }

    pub fn create_session(&self, node: &str, session: &str) -> Result<(), String> {
        validate_session_name(session)?;
        let remote = format!("tmux new-session -d -s {}", shell_quote(session));
        self.run_mutation(node, &remote)
            .map_err(|err| format!("failed to create {node}:{session}: {err}"))
    }

    fn run_mutation(&self, node: &str, remote: &str) -> Result<(), String> {
        let args = batch_ssh_args(node, self.config.connect_timeout_secs, remote);
        let output = self.runner.run("ssh", &args)?;
        if output.success {
            Ok(())
        } else {
            Err(first_line_or(&output.stderr, "remote command failed"))
        }
    }
}

fn first_line_or(text: &str, fallback: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
