#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Condvar, Mutex};

use slurmux::alert::{AlertSink, IdleAlert};
use slurmux::remote::{CommandOutput, CommandRunner};

#[derive(Clone, Debug)]
pub enum NodeScript {
    Sessions(Vec<(String, u32)>),
    NoServer,
    Unreachable(String),
}

#[derive(Default)]
struct ClusterState {
    queue: Option<Result<String, String>>,
    hostnames: BTreeMap<String, Vec<String>>,
    nodes: BTreeMap<String, NodeScript>,
    panes: BTreeMap<(String, String), Result<Vec<String>, String>>,
}

/// Scripted squeue/scontrol/ssh responses. Every invocation is recorded.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<ClusterState>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
    gate: Option<Gate>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cluster whose squeue call blocks until the returned gate is opened.
    pub fn gated() -> (Self, Gate) {
        let gate = Gate::default();
        let cluster = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (cluster, gate)
    }

    pub fn queue(self, stdout: &str) -> Self {
        self.lock().queue = Some(Ok(stdout.to_string()));
        self
    }

    pub fn queue_failure(self, stderr: &str) -> Self {
        self.lock().queue = Some(Err(stderr.to_string()));
        self
    }

    pub fn expand(self, token: &str, hosts: &[&str]) -> Self {
        self.lock().hostnames.insert(
            token.to_string(),
            hosts.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub fn sessions(self, node: &str, sessions: &[(&str, u32)]) -> Self {
        self.lock().nodes.insert(
            node.to_string(),
            NodeScript::Sessions(
                sessions
                    .iter()
                    .map(|(name, windows)| (name.to_string(), *windows))
                    .collect(),
            ),
        );
        self
    }

    pub fn no_server(self, node: &str) -> Self {
        self.lock()
            .nodes
            .insert(node.to_string(), NodeScript::NoServer);
        self
    }

    pub fn unreachable(self, node: &str, stderr: &str) -> Self {
        self.lock()
            .nodes
            .insert(node.to_string(), NodeScript::Unreachable(stderr.to_string()));
        self
    }

    pub fn pane(self, node: &str, session: &str, lines: &[&str]) -> Self {
        self.set_pane(node, session, lines);
        self
    }

    pub fn set_pane(&self, node: &str, session: &str, lines: &[&str]) {
        self.lock().panes.insert(
            (node.to_string(), session.to_string()),
            Ok(lines.iter().map(ToString::to_string).collect()),
        );
    }

    pub fn capture_fails(self, node: &str, session: &str, stderr: &str) -> Self {
        self.lock().panes.insert(
            (node.to_string(), session.to_string()),
            Err(stderr.to_string()),
        );
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn count_program(&self, program: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(called, _)| called == program)
            .count()
    }

    /// `(node, remote command)` of every ssh call.
    pub fn ssh_commands(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter(|(program, _)| program == "ssh")
            .filter_map(|(_, args)| {
                let len = args.len();
                (len >= 2).then(|| (args[len - 2].clone(), args[len - 1].clone()))
            })
            .collect()
    }

    pub fn capture_targets(&self) -> Vec<(String, String)> {
        self.ssh_commands()
            .into_iter()
            .filter(|(_, remote)| remote.starts_with("tmux capture-pane"))
            .filter_map(|(node, remote)| target_of(&remote).map(|session| (node, session)))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClusterState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn run_ssh(&self, args: &[String]) -> CommandOutput {
        let len = args.len();
        let node = args[len - 2].clone();
        let remote = args[len - 1].clone();
        let mut state = self.lock();
        let script = state
            .nodes
            .get(&node)
            .cloned()
            .unwrap_or(NodeScript::NoServer);
        if let NodeScript::Unreachable(stderr) = &script {
            return CommandOutput::failed(stderr.clone());
        }

        if remote.starts_with("tmux list-sessions") {
            return match script {
                NodeScript::Sessions(sessions) if !sessions.is_empty() => CommandOutput::ok(
                    sessions
                        .iter()
                        .map(|(name, windows)| format!("{name}:{windows}\n"))
                        .collect::<String>(),
                ),
                _ => CommandOutput::failed("no server running on /tmp/tmux-1000/default\n"),
            };
        }
        if remote.starts_with("tmux capture-pane") {
            let session = target_of(&remote).unwrap_or_default();
            return match state.panes.get(&(node, session)) {
                Some(Ok(lines)) => CommandOutput::ok(
                    lines
                        .iter()
                        .map(|line| format!("{line}\n"))
                        .collect::<String>(),
                ),
                Some(Err(stderr)) => CommandOutput::failed(stderr.clone()),
                None => CommandOutput::ok(""),
            };
        }
        if remote.starts_with("tmux kill-session") {
            let session = target_of(&remote).unwrap_or_default();
            let Some(NodeScript::Sessions(sessions)) = state.nodes.get_mut(&node) else {
                return CommandOutput::failed("no server running on /tmp/tmux-1000/default\n");
            };
            let before = sessions.len();
            sessions.retain(|(name, _)| *name != session);
            return if sessions.len() < before {
                CommandOutput::ok("")
            } else {
                CommandOutput::failed(format!("can't find session: {session}\n"))
            };
        }
        if remote.starts_with("tmux new-session") {
            let session = remote
                .split(" -s ")
                .nth(1)
                .map(unquote)
                .unwrap_or_default();
            let entry = state
                .nodes
                .entry(node)
                .or_insert_with(|| NodeScript::Sessions(Vec::new()));
            match entry {
                NodeScript::Sessions(sessions) => sessions.push((session, 1)),
                other => *other = NodeScript::Sessions(vec![(session, 1)]),
            }
            return CommandOutput::ok("");
        }
        CommandOutput::failed(format!("unexpected remote command: {remote}"))
    }
}

impl CommandRunner for FakeCluster {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((program.to_string(), args.to_vec()));
        }
        match program {
            "squeue" => {
                if let Some(gate) = &self.gate {
                    gate.wait();
                }
                match self.lock().queue.clone() {
                    Some(Ok(stdout)) => Ok(CommandOutput::ok(stdout)),
                    Some(Err(stderr)) => Ok(CommandOutput::failed(stderr)),
                    None => Err("failed to run squeue: No such file or directory".to_string()),
                }
            }
            "scontrol" => {
                let token = args.last().cloned().unwrap_or_default();
                match self.lock().hostnames.get(&token) {
                    Some(hosts) => Ok(CommandOutput::ok(hosts.join("\n"))),
                    None => Ok(CommandOutput::failed("scontrol: error: Invalid node name")),
                }
            }
            "ssh" => Ok(self.run_ssh(args)),
            other => Err(format!("failed to run {other}: not scripted")),
        }
    }
}

fn target_of(remote: &str) -> Option<String> {
    let rest = remote.split(" -t ").nth(1)?;
    let target = rest.split(" -S ").next().unwrap_or(rest);
    Some(unquote(target))
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('\'').to_string()
}

/// Blocks scripted calls until opened.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn open(&self) {
        let (open, signal) = &*self.inner;
        if let Ok(mut open) = open.lock() {
            *open = true;
        }
        signal.notify_all();
    }

    fn wait(&self) {
        let (open, signal) = &*self.inner;
        let Ok(mut guard) = open.lock() else {
            return;
        };
        while !*guard {
            guard = match signal.wait(guard) {
                Ok(guard) => guard,
                Err(_) => return,
            };
        }
    }
}

/// Records every alert; optionally fails each delivery.
#[derive(Default)]
pub struct RecordingSink {
    alerts: Mutex<Vec<IdleAlert>>,
    failure: Option<String>,
}

impl RecordingSink {
    pub fn failing(message: &str) -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn alerts(&self) -> Vec<IdleAlert> {
        self.alerts
            .lock()
            .map(|alerts| alerts.clone())
            .unwrap_or_default()
    }
}

impl AlertSink for RecordingSink {
    fn notify(&self, alert: &IdleAlert) -> Result<(), String> {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert.clone());
        }
        match &self.failure {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}
