#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProbeFailure {
    NoSessions,
    Connectivity(String),
}

const NO_SERVER_MARKERS: &[&str] = &[
    "no server running on",
    "failed to connect to server",
    "error connecting to",
    "no sessions",
];

const CONNECTIVITY_MARKERS: &[&str] = &[
    "connection timed out",
    "operation timed out",
    "permission denied",
    "could not resolve hostname",
    "name or service not known",
    "connection refused",
    "no route to host",
    "host key verification failed",
    "connection closed by",
    "timed out after",
];

/// Parses `name:window_count` lines. The count follows the last `:`; lines that do not end in
/// a number are skipped.
pub fn parse_session_list(output: &str) -> Vec<(String, u32)> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (name, windows) = line.rsplit_once(':')?;
            let windows = windows.trim().parse::<u32>().ok()?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), windows))
        })
        .collect()
}

/// Decides whether a failed `list-sessions` run means "nothing running" or an unreachable
/// node. Anything that does not look like a transport failure counts as no sessions.
pub fn classify_list_failure(stderr: &str) -> ProbeFailure {
    let normalized = stderr.to_ascii_lowercase();
    if NO_SERVER_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
    {
        return ProbeFailure::NoSessions;
    }
    if CONNECTIVITY_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
    {
        return ProbeFailure::Connectivity(stderr.trim().to_string());
    }
    ProbeFailure::NoSessions
}

pub fn validate_session_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("session name must not be empty".to_string());
    }
    if let Some(bad) = name
        .chars()
        .find(|c| matches!(c, ':' | '.' | '\'' | '"') || c.is_whitespace())
    {
        return Err(format!("session name must not contain {bad:?}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_list_parses_names_and_window_counts() {
        let parsed = parse_session_list("train:3\nbuild:1\n\ngarbage\nnotes:x\n:2\n");
        assert_eq!(
            parsed,
            vec![("train".to_string(), 3), ("build".to_string(), 1)]
        );
    }

    #[test]
    fn benign_tmux_errors_mean_no_sessions() {
        assert_eq!(
            classify_list_failure("no server running on /tmp/tmux-1000/default"),
            ProbeFailure::NoSessions
        );
        assert_eq!(
            classify_list_failure("error connecting to /tmp/tmux-1000/default (Connection refused)"),
            ProbeFailure::NoSessions
        );
        assert_eq!(classify_list_failure("bash: tmux: command not found"), ProbeFailure::NoSessions);
    }

    #[test]
    fn transport_errors_are_connectivity_failures() {
        for stderr in [
            "ssh: connect to host gpu09 port 22: Connection timed out",
            "gpu09: Permission denied (publickey).",
            "ssh: Could not resolve hostname gpu09: Name or service not known",
        ] {
            assert!(
                matches!(classify_list_failure(stderr), ProbeFailure::Connectivity(_)),
                "expected connectivity failure for {stderr}"
            );
        }
    }

    #[test]
    fn session_names_reject_key_delimiters() {
        assert!(validate_session_name("train").is_ok());
        assert!(validate_session_name("a:b").is_err());
        assert!(validate_session_name("a.b").is_err());
        assert!(validate_session_name("a b").is_err());
        assert!(validate_session_name("").is_err());
    }
}
