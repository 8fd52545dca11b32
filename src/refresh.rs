use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::alert::{AlertSink, IdleAlert};
use crate::context::{AppContext, now_unix};
use crate::domain::{SessionKey, SessionRef};
use crate::error::CycleError;
use crate::reconcile::reconcile;
use crate::remote::CommandRunner;
use crate::slurm::discover_nodes;
use crate::store::RefreshState;
use crate::tmux::{ProbeConfig, SessionProber};
use crate::watch::WatchOutcome;

mod pool;

pub use pool::run_bounded;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RefreshOutcome {
    Completed { generation: u64, errors: usize },
    Crashed(String),
}

/// Holds the in-flight flag for one cycle and clears it when dropped, including on unwind.
struct InFlight {
    context: AppContext,
}

impl InFlight {
    fn begin(context: &AppContext) -> Option<Self> {
        let mut workspace = context.lock();
        if workspace.state.refreshing {
            return None;
        }
        workspace.state.refreshing = true;
        Some(Self {
            context: context.clone(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.context.lock().state.refreshing = false;
    }
}

/// Runs refresh cycles on a background thread, at most one at a time.
pub struct RefreshCoordinator {
    context: AppContext,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn AlertSink>,
    user: Option<String>,
    worker: Option<JoinHandle<()>>,
    sender: Sender<RefreshOutcome>,
    receiver: Receiver<RefreshOutcome>,
}

impl RefreshCoordinator {
    pub fn new(
        context: AppContext,
        runner: Arc<dyn CommandRunner>,
        sink: Arc<dyn AlertSink>,
        user: Option<String>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            context,
            runner,
            sink,
            user,
            worker: None,
            sender,
            receiver,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Starts a cycle unless one is already running. Returns whether a cycle was started.
    pub fn trigger_refresh(&mut self) -> bool {
        let Some(in_flight) = InFlight::begin(&self.context) else {
            debug!("refresh already in flight");
            return false;
        };
        // A finished worker from the previous cycle may still be unjoined.
        if let Some(previous) = self.worker.take()
            && previous.join().is_err()
        {
            warn!("previous refresh worker panicked");
        }

        let context = self.context.clone();
        let runner = Arc::clone(&self.runner);
        let sink = Arc::clone(&self.sink);
        let user = self.user.clone();
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("slurmux-refresh".to_string())
            .spawn(move || {
                let outcome =
                    run_refresh_cycle(&context, runner.as_ref(), sink.as_ref(), user.as_deref());
                drop(in_flight);
                let _ = sender.send(outcome);
            });
        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                true
            }
            Err(err) => {
                self.context.record_error(CycleError::Crashed(format!(
                    "failed to spawn refresh worker: {err}"
                )));
                false
            }
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.context.is_refreshing()
    }

    /// Non-blocking check for a finished cycle. A worker that died without reporting is
    /// turned into `Crashed` and recorded in the error log.
    pub fn poll_completion(&mut self) -> Option<RefreshOutcome> {
        if let Ok(outcome) = self.receiver.try_recv() {
            self.reap_worker();
            return Some(outcome);
        }
        let finished = self.worker.as_ref().is_some_and(JoinHandle::is_finished);
        if !finished {
            return None;
        }
        if let Ok(outcome) = self.receiver.try_recv() {
            self.reap_worker();
            return Some(outcome);
        }
        let handle = self.worker.take()?;
        let message = match handle.join() {
            Ok(()) => "refresh worker exited without reporting".to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        self.context
            .record_error(CycleError::Crashed(message.clone()));
        Some(RefreshOutcome::Crashed(message))
    }

    /// Blocks until the running cycle, if any, has finished.
    pub fn wait(&mut self) -> Option<RefreshOutcome> {
        let handle = self.worker.take()?;
        let joined = handle.join();
        if let Some(outcome) = self.receiver.try_iter().last() {
            return Some(outcome);
        }
        let message = match joined {
            Ok(()) => "refresh worker exited without reporting".to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        self.context
            .record_error(CycleError::Crashed(message.clone()));
        Some(RefreshOutcome::Crashed(message))
    }

    fn reap_worker(&mut self) {
        if self.worker.as_ref().is_some_and(JoinHandle::is_finished)
            && let Some(handle) = self.worker.take()
        {
            let _ = handle.join();
        }
    }
}

/// Runs one cycle on the calling thread. Returns `None` when another cycle holds the flag.
pub fn refresh_now(
    context: &AppContext,
    runner: &dyn CommandRunner,
    sink: &dyn AlertSink,
    user: Option<&str>,
) -> Option<RefreshOutcome> {
    let in_flight = InFlight::begin(context)?;
    let outcome = run_refresh_cycle(context, runner, sink, user);
    drop(in_flight);
    Some(outcome)
}

/// One full cycle: discover nodes, probe them, capture live panes, advance watches, send
/// alerts and publish the reconciled view. The workspace lock is never held across remote
/// calls.
fn run_refresh_cycle(
    context: &AppContext,
    runner: &dyn CommandRunner,
    sink: &dyn AlertSink,
    user: Option<&str>,
) -> RefreshOutcome {
    let config = context.config();
    let workers = config.max_workers;
    let discovery = discover_nodes(runner, user);
    let mut errors = discovery.errors;
    let nodes: Vec<String> = discovery.nodes.keys().cloned().collect();
    info!(nodes = nodes.len(), "refresh started");

    let prober = SessionProber::new(runner, ProbeConfig::from(&config));
    let listings = run_bounded(&nodes, workers, |node| prober.list_sessions(node));
    let mut live = Vec::new();
    for (node, (sessions, error)) in nodes.iter().zip(listings) {
        if let Some(message) = error {
            errors.push(CycleError::Probe {
                node: node.clone(),
                message,
            });
        }
        live.extend(
            sessions
                .into_iter()
                .map(|(name, windows)| SessionRef::new(node.as_str(), name, windows)),
        );
    }

    let captures = run_bounded(&live, workers, |session| {
        prober.try_capture(&session.node, &session.session_name)
    });
    let captures: Vec<(SessionKey, Result<Vec<String>, String>)> =
        live.iter().map(SessionRef::key).zip(captures).collect();

    let now = now_unix();
    let due: Vec<IdleAlert> = {
        let mut workspace = context.lock();
        captures
            .iter()
            .filter_map(|(key, result)| {
                // Failed captures say nothing about pane activity.
                let lines = result.as_ref().ok()?;
                match workspace.watches.observe(key, lines, now) {
                    WatchOutcome::AlertDue { idle_secs } => {
                        Some(IdleAlert::from_idle_secs(key.clone(), idle_secs))
                    }
                    _ => None,
                }
            })
            .collect()
    };

    let delivery = run_bounded(&due, workers, |alert| sink.notify(alert));
    for (alert, result) in due.iter().zip(delivery) {
        if let Err(message) = result {
            errors.push(CycleError::Alert {
                key: alert.key.clone(),
                message,
            });
        }
    }

    let live_keys: BTreeSet<SessionKey> = live.iter().map(SessionRef::key).collect();
    let mut snapshot_lines = Vec::with_capacity(captures.len());
    for (key, result) in captures {
        match result {
            Ok(lines) => snapshot_lines.push((key, lines)),
            Err(message) => {
                snapshot_lines.push((key.clone(), vec![format!("Error fetching snapshot: {message}")]));
                errors.push(CycleError::Capture { key, message });
            }
        }
    }

    let mut guard = context.lock();
    let workspace = &mut *guard;
    let items = reconcile(&live, workspace.notes.as_map(), &discovery.nodes);
    workspace
        .snapshots
        .replace_with_captures(snapshot_lines, &live_keys, &workspace.notes);
    if let Err(err) = workspace.snapshots.save_to_path(&context.paths().snapshots) {
        errors.push(CycleError::Persist(err));
    }
    if let Err(err) = workspace.watches.save_to_path(&context.paths().watches) {
        errors.push(CycleError::Persist(err));
    }
    for error in &errors {
        workspace.error_log.push(now, error.to_string());
    }

    let generation = workspace.state.generation + 1;
    let error_count = errors.len();
    workspace.state = RefreshState {
        generation,
        nodes: discovery.nodes,
        items,
        errors,
        // Cleared by the in-flight guard so a new cycle cannot start before this one lets go.
        refreshing: workspace.state.refreshing,
        last_refresh_unix: Some(now),
    };
    info!(generation, errors = error_count, "refresh published");
    RefreshOutcome::Completed {
        generation,
        errors: error_count,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("refresh worker panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("refresh worker panicked: {message}")
    } else {
        "refresh worker panicked".to_string()
    }
}
