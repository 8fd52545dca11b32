use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{info, warn};

use crate::context::{AppContext, now_unix};
use crate::error::CycleError;
use crate::refresh::{RefreshCoordinator, RefreshOutcome};
use crate::remote::{SystemRunner, exec_interactive};

use super::render_surface::render;
use super::runtime_actions::{ConfiguredWebhook, apply_action};
use super::runtime_sessions::{SessionCommandWorker, finish_session_command};
use super::{AppEventResult, AppModel, FollowUp};

const UI_TICK: Duration = Duration::from_millis(100);

pub(super) fn run_tui(context: AppContext, user: Option<String>) -> Result<(), String> {
    enable_raw_mode().map_err(|err| format!("failed to enable raw mode: {err}"))?;
    execute!(stdout(), EnterAlternateScreen)
        .map_err(|err| format!("failed to enter alternate screen: {err}"))?;
    let _guard = TerminalGuard;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|err| format!("failed to create terminal: {err}"))?;

    let runner = Arc::new(SystemRunner::new(context.config().command_timeout()));
    let sink = Arc::new(ConfiguredWebhook::new(context.clone()));
    let mut coordinator =
        RefreshCoordinator::new(context.clone(), runner.clone(), sink, user.clone());
    let mut commands = SessionCommandWorker::new(runner);
    let mut model = AppModel::new(user.unwrap_or_else(|| "?".to_string()));
    model.sync_from_workspace(&context.lock(), now_unix());

    coordinator.trigger_refresh();
    let mut last_trigger = Instant::now();
    info!("tui started");

    loop {
        if let Some(outcome) = coordinator.poll_completion() {
            match outcome {
                RefreshOutcome::Completed { generation, errors } => {
                    model.note_refresh_success(generation, errors);
                }
                RefreshOutcome::Crashed(message) => model.note_refresh_error(message),
            }
        }
        model.sync_from_workspace(&context.lock(), now_unix());

        terminal
            .draw(|frame| render(frame, &mut model))
            .map_err(|err| format!("failed to draw frame: {err}"))?;

        if event::poll(UI_TICK).map_err(|err| format!("event poll failed: {err}"))?
            && let Event::Key(key) =
                event::read().map_err(|err| format!("event read failed: {err}"))?
        {
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            if model.handle_key(key) == AppEventResult::Quit {
                break;
            }
        }

        let mut follow_ups = Vec::new();
        while let Some(done) = commands.poll() {
            follow_ups.push(finish_session_command(&mut model, &context, done));
        }
        for action in model.take_actions() {
            follow_ups.push(apply_action(&mut model, &context, &mut commands, action));
        }
        for follow_up in follow_ups {
            match follow_up {
                FollowUp::None => {}
                FollowUp::Refresh => {
                    if coordinator.trigger_refresh() {
                        last_trigger = Instant::now();
                    } else {
                        model.set_status_message("refresh already running");
                    }
                }
                FollowUp::Handoff(args) => {
                    if let Err(err) = hand_off_terminal(&mut terminal, &args) {
                        model.set_status_message(err.clone());
                        context.record_error(CycleError::Command(err));
                    }
                    if coordinator.trigger_refresh() {
                        last_trigger = Instant::now();
                    }
                }
            }
        }

        let interval = context.config().refresh_interval();
        if !coordinator.is_refreshing()
            && last_trigger.elapsed() >= interval
            && coordinator.trigger_refresh()
        {
            last_trigger = Instant::now();
        }
    }

    info!("tui exiting");
    Ok(())
}

/// Gives the terminal to an interactive ssh and takes it back afterwards.
fn hand_off_terminal<B: Backend>(
    terminal: &mut Terminal<B>,
    args: &[String],
) -> Result<(), String> {
    disable_raw_mode().map_err(|err| format!("failed to disable raw mode: {err}"))?;
    let _ = execute!(io::stdout(), LeaveAlternateScreen);

    let status = exec_interactive(args);

    let _ = execute!(io::stdout(), EnterAlternateScreen);
    enable_raw_mode().map_err(|err| format!("failed to re-enable raw mode: {err}"))?;
    let _ = terminal.clear();

    let status = status?;
    if status.success() {
        Ok(())
    } else {
        warn!(?status, args = ?args, "interactive ssh exited with failure");
        Err(format!("ssh {} exited with {status}", args.join(" ")))
    }
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}
