use crate::context::AppContext;
use render_surface::render_to_string as render_to_string_surface;
use runtime_actions::apply_action;
use runtime_loop::run_tui as run_tui_inner;
use runtime_sessions::finish_session_command;

pub use model_core::AppModel;
pub use runtime_sessions::{SessionCommand, SessionCommandDone, SessionCommandWorker};
pub use types::{
    AppEventResult, FollowUp, Prompt, PromptKind, Screen, UiAction, UiRow, WatchBadge,
};

mod key_handling;
mod log_status_state;
mod model_core;
mod render_helpers;
mod render_left_panes;
mod render_right_panes;
mod render_screens;
mod render_sections;
mod render_surface;
mod render_text_utils;
mod runtime_actions;
mod runtime_loop;
mod runtime_sessions;
mod settings_actions;
mod settings_render;
mod settings_types;
mod state_navigation;
mod types;

pub fn run_tui(context: AppContext, user: Option<String>) -> Result<(), String> {
    run_tui_inner(context, user)
}

/// Applies a queued action the way the running TUI does, minus the terminal handoff.
pub fn apply_ui_action(
    model: &mut AppModel,
    context: &AppContext,
    commands: &mut SessionCommandWorker,
    action: UiAction,
) -> FollowUp {
    apply_action(model, context, commands, action)
}

/// Reports the next finished create/kill, if any, and what the runtime should do next.
pub fn poll_session_commands(
    model: &mut AppModel,
    context: &AppContext,
    commands: &mut SessionCommandWorker,
) -> Option<FollowUp> {
    let done = commands.poll()?;
    Some(finish_session_command(model, context, done))
}

pub fn render_to_string(model: &AppModel, width: u16, height: u16) -> String {
    render_to_string_surface(model, width, height)
}
