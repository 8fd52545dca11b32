use tracing::{debug, warn};

use crate::domain::NodeTimes;
use crate::error::CycleError;
use crate::remote::CommandRunner;

mod parser;

pub use parser::{QueueRecord, needs_expansion, parse_expanded_hostnames, parse_queue_output, parse_time_left};

pub const QUEUE_FORMAT: &str = "%N|%L";

#[derive(Clone, Debug, Default)]
pub struct NodeDiscovery {
    pub nodes: NodeTimes,
    pub errors: Vec<CycleError>,
}

pub fn current_user() -> Option<String> {
    ["USER", "LOGNAME"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Lists the user's allocated nodes with their remaining time. Never fails: problems are
/// returned alongside whatever could be discovered.
pub fn discover_nodes<R: CommandRunner + ?Sized>(runner: &R, user: Option<&str>) -> NodeDiscovery {
    let mut discovery = NodeDiscovery::default();
    let Some(user) = user.filter(|value| !value.trim().is_empty()) else {
        discovery
            .errors
            .push(CycleError::Discovery("USER environment variable not set".to_string()));
        return discovery;
    };

    let args = vec![
        "-u".to_string(),
        user.to_string(),
        "-h".to_string(),
        "-o".to_string(),
        QUEUE_FORMAT.to_string(),
    ];
    let output = match runner.run("squeue", &args) {
        Ok(output) if output.success => output,
        Ok(output) => {
            let message = format!("squeue failed: {}", output.stderr.trim());
            warn!(%message, "node discovery failed");
            discovery.errors.push(CycleError::Discovery(message));
            return discovery;
        }
        Err(err) => {
            warn!(error = %err, "node discovery failed");
            discovery.errors.push(CycleError::Discovery(err));
            return discovery;
        }
    };

    for record in parse_queue_output(&output.stdout) {
        let hosts = if needs_expansion(&record.node_list) {
            expand_node_list(runner, &record.node_list)
        } else {
            vec![record.node_list.clone()]
        };
        for host in hosts {
            insert_longest(&mut discovery.nodes, host, &record.time_left);
        }
    }
    debug!(nodes = discovery.nodes.len(), "node discovery finished");
    discovery
}

/// Expands `gpu[01-03],cpu7` style lists. Falls back to the raw token on any failure.
pub fn expand_node_list<R: CommandRunner + ?Sized>(runner: &R, token: &str) -> Vec<String> {
    let args = vec![
        "show".to_string(),
        "hostnames".to_string(),
        token.to_string(),
    ];
    match runner.run("scontrol", &args) {
        Ok(output) if output.success => {
            let hosts = parse_expanded_hostnames(&output.stdout);
            if hosts.is_empty() {
                vec![token.to_string()]
            } else {
                hosts
            }
        }
        Ok(output) => {
            debug!(token, stderr = %output.stderr.trim(), "hostname expansion failed");
            vec![token.to_string()]
        }
        Err(err) => {
            debug!(token, error = %err, "hostname expansion failed");
            vec![token.to_string()]
        }
    }
}

/// A node may carry several jobs; keep whichever allocation outlives the others.
fn insert_longest(nodes: &mut NodeTimes, host: String, time_left: &str) {
    match nodes.get(&host) {
        Some(existing) if parse_time_left(existing) >= parse_time_left(time_left) => {}
        _ => {
            nodes.insert(host, time_left.to_string());
        }
    }
}
