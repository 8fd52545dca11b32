use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::SessionKey;
use crate::error::CycleError;
use crate::remote::CommandRunner;
use crate::tmux::{ProbeConfig, SessionProber};

use super::{AppModel, FollowUp};

/// Remote tmux mutation issued from the UI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionCommand {
    Create { node: String, name: String },
    Kill(SessionKey),
}

impl SessionCommand {
    fn target(&self) -> String {
        match self {
            SessionCommand::Create { node, name } => format!("{node}:{name}"),
            SessionCommand::Kill(key) => key.to_string(),
        }
    }

    fn pending_message(&self) -> String {
        match self {
            SessionCommand::Create { .. } => format!("creating {}...", self.target()),
            SessionCommand::Kill(_) => format!("killing {}...", self.target()),
        }
    }

    fn done_message(&self) -> String {
        match self {
            SessionCommand::Create { .. } => format!("created {}", self.target()),
            SessionCommand::Kill(_) => format!("killed {}", self.target()),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionCommandDone {
    pub command: SessionCommand,
    pub result: Result<(), String>,
}

/// Runs create/kill over ssh on worker threads so the event loop keeps drawing.
pub struct SessionCommandWorker {
    runner: Arc<dyn CommandRunner>,
    next_id: u64,
    workers: Vec<(u64, SessionCommand, JoinHandle<()>)>,
    sender: Sender<(u64, SessionCommandDone)>,
    receiver: Receiver<(u64, SessionCommandDone)>,
}

impl SessionCommandWorker {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            runner,
            next_id: 0,
            workers: Vec::new(),
            sender,
            receiver,
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.workers.is_empty()
    }

    pub fn submit(&mut self, command: SessionCommand, config: ProbeConfig) -> Result<(), String> {
        let id = self.next_id;
        self.next_id += 1;
        let runner = Arc::clone(&self.runner);
        let sender = self.sender.clone();
        let job = command.clone();
        let handle = thread::Builder::new()
            .name("slurmux-session-cmd".to_string())
            .spawn(move || {
                let prober = SessionProber::new(runner.as_ref(), config);
                let result = match &job {
                    SessionCommand::Create { node, name } => prober.create_session(node, name),
                    SessionCommand::Kill(key) => prober.kill_session(&key.node, &key.session),
                };
                let _ = sender.send((
                    id,
                    SessionCommandDone {
                        command: job,
                        result,
                    },
                ));
            })
            .map_err(|err| format!("failed to spawn session command worker: {err}"))?;
        self.workers.push((id, command, handle));
        Ok(())
    }

    /// Non-blocking: the next finished command, if any. A worker that died without reporting
    /// comes back as a failed command.
    pub fn poll(&mut self) -> Option<SessionCommandDone> {
        if let Some(done) = self.receive() {
            return Some(done);
        }
        let index = self
            .workers
            .iter()
            .position(|(_, _, handle)| handle.is_finished())?;
        // It may have reported between the first check and `is_finished`.
        if let Some(done) = self.receive() {
            return Some(done);
        }
        let (_, command, handle) = self.workers.swap_remove(index);
        let message = match handle.join() {
            Ok(()) => "session command exited without reporting".to_string(),
            Err(_) => "session command worker panicked".to_string(),
        };
        warn!(session = %command.target(), %message, "session command lost");
        Some(SessionCommandDone {
            command,
            result: Err(message),
        })
    }

    fn receive(&mut self) -> Option<SessionCommandDone> {
        let (id, done) = self.receiver.try_recv().ok()?;
        if let Some(index) = self.workers.iter().position(|(worker, _, _)| *worker == id) {
            let (_, _, handle) = self.workers.swap_remove(index);
            // The worker exits right after sending.
            let _ = handle.join();
        }
        Some(done)
    }
}

pub(super) fn start_session_command(
    model: &mut AppModel,
    context: &AppContext,
    commands: &mut SessionCommandWorker,
    command: SessionCommand,
) -> FollowUp {
    let pending = command.pending_message();
    match commands.submit(command, ProbeConfig::from(&context.config())) {
        Ok(()) => model.set_status_message(pending),
        Err(err) => {
            model.set_status_message(err.clone());
            context.record_error(CycleError::Command(err));
        }
    }
    FollowUp::None
}

/// Reports a finished command to the user. Successful mutations ask for a refresh.
pub(super) fn finish_session_command(
    model: &mut AppModel,
    context: &AppContext,
    done: SessionCommandDone,
) -> FollowUp {
    match done.result {
        Ok(()) => {
            info!(session = %done.command.target(), "session command finished");
            model.set_status_message(done.command.done_message());
            FollowUp::Refresh
        }
        Err(err) => {
            model.set_status_message(err.clone());
            context.record_error(CycleError::Command(err));
            FollowUp::None
        }
    }
}
