use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static CLOCK_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+)-)?(?:(\d+):)?(\d+):(\d+)$").ok());

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueueRecord {
    pub node_list: String,
    pub time_left: String,
}

/// Parses `squeue -o "%N|%L"` output. Lines that do not carry exactly two fields, or whose
/// node list is empty (pending jobs), are skipped.
pub fn parse_queue_output(output: &str) -> Vec<QueueRecord> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() != 2 {
                return None;
            }
            let node_list = parts[0].trim();
            if node_list.is_empty() || node_list.starts_with('(') {
                return None;
            }
            Some(QueueRecord {
                node_list: node_list.to_string(),
                time_left: parts[1].trim().to_string(),
            })
        })
        .collect()
}

pub fn needs_expansion(node_list: &str) -> bool {
    node_list.contains('[') || node_list.contains(',')
}

/// One hostname per line, order kept, duplicates dropped.
pub fn parse_expanded_hostnames(output: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    output
        .lines()
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .filter(|host| seen.insert(host.to_string()))
        .map(ToString::to_string)
        .collect()
}

/// Seconds remaining for Slurm `%L` values (`D-HH:MM:SS`, `HH:MM:SS`, `MM:SS`, `D-HH`).
/// `UNLIMITED` sorts above everything; unparsable values yield `None`.
pub fn parse_time_left(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("UNLIMITED") {
        return Some(u64::MAX);
    }
    if let Some((days, hours)) = value.split_once('-')
        && !hours.contains(':')
    {
        let days = days.parse::<u64>().ok()?;
        let hours = hours.parse::<u64>().ok()?;
        return Some(to_seconds(days, hours, 0, 0));
    }
    let captures = CLOCK_PATTERN.as_ref()?.captures(value)?;
    let field = |index: usize| -> u64 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    let days = field(1);
    let (hours, minutes, seconds) = if captures.get(2).is_some() {
        (field(2), field(3), field(4))
    } else {
        (0, field(3), field(4))
    };
    Some(to_seconds(days, hours, minutes, seconds))
}

fn to_seconds(days: u64, hours: u64, minutes: u64, seconds: u64) -> u64 {
    days.saturating_mul(86_400)
        .saturating_add(hours.saturating_mul(3_600))
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds)
}
